//! Tally feed sources
//!
//! The feed is a small CSV file with a header row and a single data row,
//! rewritten in place by whoever maintains the tallies. Sources only fetch
//! the text; [`parse_record`] turns it into a [`RawRecord`].

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::domain::RawRecord;
use crate::error::{CupError, Result};

/// Something that can deliver the current feed text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the raw CSV text
    async fn fetch(&self) -> Result<String>;

    /// Human readable location, for logs
    fn describe(&self) -> String;
}

/// Fetch and parse one snapshot
pub async fn fetch_record(source: &dyn FeedSource) -> Result<RawRecord> {
    let text = source.fetch().await?;
    parse_record(&text)
}

/// Parse feed text: the first data row, keyed by column header.
pub fn parse_record(text: &str) -> Result<RawRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let mut rows = reader.records();

    let first = match rows.next() {
        Some(row) => row?,
        None => return Err(CupError::FeedUnavailable("feed has no data rows".to_string())),
    };

    let skipped = rows.count();
    if skipped > 0 {
        debug!("Ignoring {} extra feed rows", skipped);
    }

    Ok(RawRecord::from_pairs(
        headers
            .iter()
            .zip(first.iter())
            .map(|(key, value)| (key.trim(), value)),
    ))
}

/// Feed served over HTTP(S)
#[derive(Clone)]
pub struct HttpFeed {
    http: Client,
    url: Url,
}

impl HttpFeed {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(url)?;
        let http = Client::builder()
            .user_agent("kiddush-cup/0.1")
            .timeout(timeout)
            .build()?;

        Ok(Self { http, url })
    }

    /// URL with a cache-busting parameter so intermediaries never serve a
    /// stale tally
    pub fn cache_busted_url(&self, now_millis: i64) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair("_", &now_millis.to_string());
        url
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn fetch(&self) -> Result<String> {
        let url = self.cache_busted_url(Utc::now().timestamp_millis());
        debug!("Fetching feed {}", url);

        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// Feed read from the local filesystem
#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedSource for FileFeed {
    async fn fetch(&self) -> Result<String> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Build a source from a configured location.
///
/// `http://` and `https://` go over the network, `file://` URLs and bare
/// paths are read from disk.
pub fn source_from_location(location: &str, timeout: Duration) -> Result<Box<dyn FeedSource>> {
    let location = location.trim();
    if location.starts_with("http://") || location.starts_with("https://") {
        return Ok(Box::new(HttpFeed::new(location, timeout)?));
    }
    if location.starts_with("file://") {
        let url = Url::parse(location)?;
        let path = url
            .to_file_path()
            .map_err(|_| CupError::InvalidConfig(format!("invalid file URL: {location}")))?;
        return Ok(Box::new(FileFeed::new(path)));
    }
    if location.contains("://") {
        return Err(CupError::InvalidConfig(format!(
            "unsupported feed scheme: {location}"
        )));
    }
    Ok(Box::new(FileFeed::new(location)))
}
