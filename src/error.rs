use thiserror::Error;

/// Main error type for the scoreboard
#[derive(Error, Debug)]
pub enum CupError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Feed errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid feed URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Feed unavailable: {0}")]
    FeedUnavailable(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CupError {
    /// Whether a poll that failed with this error should simply be skipped.
    ///
    /// Transport, parse and empty-feed failures are recoverable: the previous
    /// snapshot stays on the board until the next successful poll.
    pub fn is_feed_failure(&self) -> bool {
        matches!(
            self,
            CupError::Http(_) | CupError::Csv(_) | CupError::FeedUnavailable(_) | CupError::Io(_)
        )
    }

    /// Whether this error means the deployment itself is misconfigured.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CupError::Config(_) | CupError::InvalidConfig(_) | CupError::Url(_)
        )
    }
}

/// Result type alias for CupError
pub type Result<T> = std::result::Result<T, CupError>;
