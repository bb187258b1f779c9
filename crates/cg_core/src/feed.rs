use async_trait::async_trait;
use crate::Result;

/// One page of the feed, selected by offset and limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub offset: usize,
    pub limit: usize,
    /// Server-side recency filter in days, when the endpoint supports one.
    pub within_days: Option<i64>,
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Returns a human readable name for log lines
    fn name(&self) -> &str;

    /// Fetches the raw bytes of one feed page.
    ///
    /// Rate limiting, non-success statuses and transport failures are
    /// reported as errors; deciding whether the body is feed markup is left
    /// to the caller.
    async fn fetch_page(&self, request: &FeedRequest) -> Result<Vec<u8>>;
}
