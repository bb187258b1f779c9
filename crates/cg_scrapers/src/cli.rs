use clap::Args;
use cg_core::config::{
    ContentMode, FeedConfig, IdStrategy, ScrapeConfig, DEFAULT_AUTHOR, DEFAULT_ENDPOINT,
    DEFAULT_USER_AGENT,
};

/// Options controlling how the feed is paged and normalized.
#[derive(Args, Debug, Clone)]
pub struct ScrapeArgs {
    /// Only keep articles published within this many days
    #[arg(long, env = "CG_WINDOW_DAYS", default_value_t = 14)]
    pub window_days: i64,

    /// Entries requested per page
    #[arg(long, env = "CG_PAGE_SIZE", default_value_t = 100)]
    pub page_size: usize,

    /// Stop once the offset passes this value
    #[arg(long, env = "CG_MAX_OFFSET", default_value_t = 1000)]
    pub max_offset: usize,

    /// Pause between pages (e.g. 2s, 1500ms)
    #[arg(long, env = "CG_DELAY", default_value = "2s")]
    pub delay: humantime::Duration,

    /// Keep paging after a page shorter than the page size
    #[arg(long)]
    pub no_short_page_stop: bool,

    #[arg(long, value_enum, env = "CG_CONTENT_MODE", default_value_t = ContentMode::Raw)]
    pub content_mode: ContentMode,

    #[arg(long, value_enum, env = "CG_ID_STRATEGY", default_value_t = IdStrategy::LinkFilename)]
    pub id_strategy: IdStrategy,

    /// Author used when an item has no creator
    #[arg(long, env = "CG_DEFAULT_AUTHOR", default_value = DEFAULT_AUTHOR)]
    pub default_author: String,
}

impl ScrapeArgs {
    pub fn to_config(&self) -> ScrapeConfig {
        ScrapeConfig {
            window_days: self.window_days,
            page_size: self.page_size,
            max_offset: self.max_offset,
            delay: self.delay.into(),
            stop_on_short_page: !self.no_short_page_stop,
            content_mode: self.content_mode,
            id_strategy: self.id_strategy,
            default_author: self.default_author.clone(),
        }
    }
}

/// Options for reaching the feed endpoint.
#[derive(Args, Debug, Clone)]
pub struct FeedArgs {
    /// Search endpoint; paging parameters are appended to it
    #[arg(long, env = "CG_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    #[arg(long, env = "CG_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Request timeout (e.g. 30s)
    #[arg(long, env = "CG_TIMEOUT", default_value = "30s")]
    pub timeout: humantime::Duration,

    /// Also ask the server to filter to the last N days
    #[arg(long, env = "CG_SERVER_WINDOW_DAYS")]
    pub server_window_days: Option<i64>,
}

impl FeedArgs {
    pub fn to_config(&self) -> FeedConfig {
        FeedConfig {
            endpoint: self.endpoint.clone(),
            user_agent: self.user_agent.clone(),
            timeout: self.timeout.into(),
            server_window_days: self.server_window_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::time::Duration;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        scrape: ScrapeArgs,
        #[command(flatten)]
        feed: FeedArgs,
    }

    #[test]
    fn test_defaults_match_config_defaults() {
        let cli = TestCli::parse_from(["cg"]);
        let scrape = cli.scrape.to_config();
        let expected = ScrapeConfig::default();
        assert_eq!(scrape.window_days, expected.window_days);
        assert_eq!(scrape.page_size, expected.page_size);
        assert_eq!(scrape.delay, expected.delay);
        assert!(scrape.stop_on_short_page);
        assert_eq!(cli.feed.to_config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let cli = TestCli::parse_from([
            "cg",
            "--page-size",
            "25",
            "--delay",
            "500ms",
            "--no-short-page-stop",
            "--content-mode",
            "plain",
            "--id-strategy",
            "guid-uuid",
            "--server-window-days",
            "7",
        ]);
        let scrape = cli.scrape.to_config();
        assert_eq!(scrape.page_size, 25);
        assert_eq!(scrape.delay, Duration::from_millis(500));
        assert!(!scrape.stop_on_short_page);
        assert_eq!(scrape.content_mode, ContentMode::Plain);
        assert_eq!(scrape.id_strategy, IdStrategy::GuidUuid);
        assert_eq!(cli.feed.to_config().server_window_days, Some(7));
    }
}
