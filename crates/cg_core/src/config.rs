//! Run configuration, built once by the binary and handed to constructors.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use clap::ValueEnum;
use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use crate::{Error, Result};

pub const DEFAULT_ENDPOINT: &str = "https://www.psucollegian.com/search/";
pub const DEFAULT_AUTHOR: &str = "The Daily Collegian";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Longest recency window accepted, client or server side.
pub const MAX_WINDOW_DAYS: i64 = 3650;
/// Shortest pause allowed between feed pages.
pub const MIN_PAGE_DELAY: Duration = Duration::from_millis(500);

/// How the description is turned into article content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentMode {
    /// Description text as published, trimmed
    #[default]
    Raw,
    /// Tags stripped, whitespace collapsed, lower-cased
    Plain,
}

/// Where the deduplication key comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Token at the end of the link's file name (`article_<token>.html`)
    #[default]
    LinkFilename,
    /// UUID-shaped substring of the guid
    GuidUuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapeConfig {
    pub window_days: i64,
    pub page_size: usize,
    pub max_offset: usize,
    #[serde(serialize_with = "human_duration")]
    pub delay: Duration,
    pub stop_on_short_page: bool,
    pub content_mode: ContentMode,
    pub id_strategy: IdStrategy,
    pub default_author: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            window_days: 14,
            page_size: 100,
            max_offset: 1000,
            delay: Duration::from_secs(2),
            stop_on_short_page: true,
            content_mode: ContentMode::default(),
            id_strategy: IdStrategy::default(),
            default_author: DEFAULT_AUTHOR.to_string(),
        }
    }
}

impl ScrapeConfig {
    /// Earliest publish time kept by a run starting at `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        ChronoDuration::try_days(self.window_days)
            .and_then(|window| now.checked_sub_signed(window))
            .ok_or_else(|| {
                Error::Config(format!("window of {} days is out of range", self.window_days))
            })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedConfig {
    pub endpoint: String,
    pub user_agent: String,
    #[serde(serialize_with = "human_duration")]
    pub timeout: Duration,
    /// Ask the server to only return items from the last N days.
    pub server_window_days: Option<i64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            server_window_days: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// Skip the database mirror
    #[value(name = "none")]
    #[serde(rename = "none")]
    Disabled,
    Memory,
    #[default]
    Sqlite,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageConfig {
    pub kind: StorageKind,
    /// Backend location; for SQLite a file path or `sqlite:` URL.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncConfig {
    pub scrape: ScrapeConfig,
    pub feed: FeedConfig,
    pub storage: StorageConfig,
    pub snapshot_path: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            scrape: ScrapeConfig::default(),
            feed: FeedConfig::default(),
            storage: StorageConfig::default(),
            snapshot_path: PathBuf::from("articles.json"),
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<()> {
        if self.scrape.page_size == 0 {
            return Err(Error::Config("page size must be at least 1".to_string()));
        }
        if !(0..=MAX_WINDOW_DAYS).contains(&self.scrape.window_days) {
            return Err(Error::Config(format!(
                "window must be between 0 and {} days",
                MAX_WINDOW_DAYS
            )));
        }
        if matches!(self.feed.server_window_days, Some(days) if !(0..=MAX_WINDOW_DAYS).contains(&days)) {
            return Err(Error::Config(format!(
                "server window must be between 0 and {} days",
                MAX_WINDOW_DAYS
            )));
        }
        if self.scrape.delay < MIN_PAGE_DELAY {
            return Err(Error::Config(format!(
                "page delay must be at least {}",
                humantime::format_duration(MIN_PAGE_DELAY)
            )));
        }
        if self.feed.timeout.is_zero() {
            return Err(Error::Config("request timeout must be non-zero".to_string()));
        }
        Url::parse(&self.feed.endpoint)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", self.feed.endpoint, e)))?;
        if self.snapshot_path.as_os_str().is_empty() {
            return Err(Error::Config("snapshot path is empty".to_string()));
        }
        Ok(())
    }
}

fn human_duration<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&humantime::format_duration(*duration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_defaults_are_valid() {
        let config = SyncConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scrape.page_size, 100);
        assert_eq!(config.scrape.max_offset, 1000);
        assert_eq!(config.feed.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = SyncConfig::default();
        config.scrape.page_size = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = SyncConfig::default();
        config.feed.endpoint = "not a url".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_cutoff() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let scrape = ScrapeConfig::default();
        assert_eq!(
            scrape.cutoff(now).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
        );

        let mut config = SyncConfig::default();
        config.feed.server_window_days = Some(-1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_window_is_an_error_not_a_panic() {
        let mut config = SyncConfig::default();
        config.scrape.window_days = 1_000_000_000;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        assert!(matches!(config.scrape.cutoff(Utc::now()), Err(Error::Config(_))));

        config.scrape.window_days = i64::MAX;
        assert!(config.scrape.cutoff(Utc::now()).is_err());

        let mut config = SyncConfig::default();
        config.feed.server_window_days = Some(MAX_WINDOW_DAYS + 1);
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = SyncConfig::default();
        config.scrape.window_days = MAX_WINDOW_DAYS;
        assert!(config.validate().is_ok());
        assert!(config.scrape.cutoff(Utc::now()).is_ok());
    }

    #[test]
    fn test_page_delay_has_a_floor() {
        let mut config = SyncConfig::default();
        config.scrape.delay = Duration::ZERO;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.scrape.delay = MIN_PAGE_DELAY;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serializes_durations_for_humans() {
        let value = serde_json::to_value(SyncConfig::default()).unwrap();
        assert_eq!(value["scrape"]["delay"], "2s");
        assert_eq!(value["feed"]["timeout"], "30s");
        assert_eq!(value["storage"]["kind"], "sqlite");
    }
}
