use chrono::{DateTime, FixedOffset, Utc};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::domain::{EventWindow, ScoreCategory, Side};
use crate::error::{CupError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub event: EventConfig,
    #[serde(default)]
    pub parties: PartiesConfig,
    pub feed: FeedConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    /// Scored categories, in display order
    pub categories: Vec<ScoreCategory>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventConfig {
    /// Competition name used in the final announcement
    #[serde(default = "default_title")]
    pub title: String,
    /// Year shown on the board
    pub year: i32,
    /// Event start (RFC 3339)
    pub start: DateTime<FixedOffset>,
    /// Event end (RFC 3339)
    pub end: DateTime<FixedOffset>,
    /// Offset used for the event-window display, e.g. "-05:00"
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

fn default_title() -> String {
    "Commonwealth Kiddush Cup".to_string()
}

fn default_utc_offset() -> String {
    "-05:00".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartyConfig {
    /// Plural display name, e.g. "Hoos"
    pub name: String,
    /// Display field receiving the point total
    pub total_field: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartiesConfig {
    pub left: PartyConfig,
    pub right: PartyConfig,
}

impl PartiesConfig {
    pub fn party(&self, side: Side) -> &PartyConfig {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

impl Default for PartiesConfig {
    fn default() -> Self {
        Self {
            left: PartyConfig {
                name: "Hoos".to_string(),
                total_field: "hooTotal".to_string(),
            },
            right: PartyConfig {
                name: "Hokies".to_string(),
                total_field: "hokieTotal".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// CSV location: http(s) URL, file:// URL, or local path
    pub source: String,
    /// Poll interval in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// HTTP request timeout in milliseconds
    #[serde(default = "default_feed_timeout")]
    pub timeout_ms: u64,
}

fn default_poll_interval() -> u64 {
    5000
}

fn default_feed_timeout() -> u64 {
    4000
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClockConfig {
    /// Countdown refresh interval in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval() -> u64 {
    1000
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily-rolling log files
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> std::result::Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("feed.poll_interval_ms", 5000)?
            .set_default("clock.tick_interval_ms", 1000)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("CUP_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (CUP_FEED__SOURCE, etc.)
            .add_source(
                Environment::with_prefix("CUP")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// The shipped `config/default.toml`, reading the feed from `source`
    #[cfg(test)]
    pub(crate) fn shipped(source: &str) -> Self {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("config");
        let mut config = Self::load_from(dir).expect("config/default.toml loads");
        config.feed.source = source.to_string();
        config
    }

    /// Offset for event-window display
    pub fn display_offset(&self) -> Result<FixedOffset> {
        parse_offset(&self.event.utc_offset)
    }

    /// Event window in UTC
    pub fn window(&self) -> Result<EventWindow> {
        EventWindow::new(
            self.event.start.with_timezone(&Utc),
            self.event.end.with_timezone(&Utc),
        )
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        // Event window
        if self.event.start >= self.event.end {
            errors.push(format!(
                "event.start ({}) must be before event.end ({})",
                self.event.start, self.event.end
            ));
        }
        if let Err(e) = parse_offset(&self.event.utc_offset) {
            errors.push(e.to_string());
        }

        // Categories
        if self.categories.is_empty() {
            errors.push("at least one category must be configured".to_string());
        }
        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.id.trim().is_empty() {
                errors.push("category id must not be empty".to_string());
            } else if !seen.insert(category.id.as_str()) {
                errors.push(format!("duplicate category id: {}", category.id));
            }
            if category.left_key.trim().is_empty() || category.right_key.trim().is_empty() {
                errors.push(format!("category {} must name both feed keys", category.id));
            } else if category.left_key == category.right_key {
                errors.push(format!(
                    "category {} uses the same key for both sides",
                    category.id
                ));
            }
        }

        // Parties
        if self.parties.left.total_field == self.parties.right.total_field {
            errors.push("parties must use distinct total fields".to_string());
        }

        // Scheduling
        if self.feed.source.trim().is_empty() {
            errors.push("feed.source must not be empty".to_string());
        }
        if self.feed.poll_interval_ms == 0 {
            errors.push("feed.poll_interval_ms must be positive".to_string());
        }
        if self.clock.tick_interval_ms == 0 {
            errors.push("clock.tick_interval_ms must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Parse an offset such as `-05:00` or `+01:00`
pub fn parse_offset(raw: &str) -> Result<FixedOffset> {
    raw.trim()
        .parse::<FixedOffset>()
        .map_err(|e| CupError::InvalidConfig(format!("invalid utc_offset {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_config_is_valid() {
        let config = AppConfig::shipped("public/assets/csv/results.csv");
        assert!(config.validate().is_ok());

        let window = config.window().unwrap();
        assert_eq!(window.end.to_rfc3339(), "2025-12-08T01:00:00+00:00");
        assert_eq!(config.display_offset().unwrap().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn test_validate_collects_errors() {
        let mut config = AppConfig::shipped("results.csv");
        config.event.end = config.event.start;
        config.event.utc_offset = "eastern".to_string();
        config.categories[1].id = config.categories[0].id.clone();
        config.categories[2].right_key = config.categories[2].left_key.clone();
        config.clock.tick_interval_ms = 0;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 5, "{errors:?}");
    }

    #[test]
    fn test_validate_requires_categories() {
        let mut config = AppConfig::shipped("results.csv");
        config.categories.clear();

        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("at least one category")));
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("+01:00").unwrap().local_minus_utc(), 3600);
        assert!(parse_offset("EST").is_err());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = std::env::temp_dir().join(format!("kiddush-cup-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("default.toml"),
            r#"
[event]
year = 2024
start = "2024-12-01T00:00:00-05:00"
end = "2024-12-07T20:00:00-05:00"

[feed]
source = "https://example.org/results.csv"

[[categories]]
id = "raised"
left_key = "raisedUVA"
right_key = "raisedTech"
points = 5
currency = true
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&dir).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(config.event.year, 2024);
        assert_eq!(config.event.title, "Commonwealth Kiddush Cup");
        assert_eq!(config.feed.poll_interval_ms, 5000);
        assert_eq!(config.clock.tick_interval_ms, 1000);
        assert_eq!(config.parties.left.name, "Hoos");
        assert_eq!(config.categories.len(), 1);
        assert!(config.categories[0].currency);
        assert!(config.validate().is_ok());
    }
}
