//! The offset-based pagination loop.
//!
//! Pages are fetched one at a time, newest first, with a politeness delay in
//! between. The loop ends on the first of:
//!
//! - a page that cannot be fetched or is not feed markup,
//! - an empty page,
//! - a non-empty page that added nothing (everything stale or already seen),
//! - a page shorter than requested (when enabled),
//! - the offset ceiling.
//!
//! Whatever was collected before the stop is returned.

use cg_core::config::ScrapeConfig;
use cg_core::{
    ArticleSet, BatchStats, EntryOutcome, FeedRequest, FeedSource, NoopObserver, Result,
    RunStats, StopReason, SyncEvent, SyncObserver,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use crate::extract::EntryExtractor;
use crate::feed::{parse_feed, FeedEntry};

#[derive(Debug, Clone)]
pub struct PaginationOutcome {
    pub articles: ArticleSet,
    pub stats: RunStats,
    pub stop: StopReason,
}

pub struct Paginator {
    source: Arc<dyn FeedSource>,
    observer: Arc<dyn SyncObserver>,
    extractor: EntryExtractor,
    config: ScrapeConfig,
    within_days: Option<i64>,
}

impl Paginator {
    pub fn new(source: Arc<dyn FeedSource>, config: ScrapeConfig) -> Self {
        Self {
            source,
            observer: Arc::new(NoopObserver),
            extractor: EntryExtractor::new(&config),
            config,
            within_days: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SyncObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Ask the feed to filter server-side as well. The client-side cutoff
    /// still applies.
    pub fn with_server_window(mut self, days: Option<i64>) -> Self {
        self.within_days = days;
        self
    }

    /// Paginate with the configured window, page size and ceiling.
    pub async fn run(&self) -> Result<PaginationOutcome> {
        let cutoff = self.config.cutoff(Utc::now())?;
        Ok(self
            .paginate(cutoff, self.config.page_size, self.config.max_offset)
            .await)
    }

    pub async fn paginate(
        &self,
        cutoff: DateTime<Utc>,
        page_size: usize,
        max_offset: usize,
    ) -> PaginationOutcome {
        let page_size = page_size.max(1);
        let mut articles = ArticleSet::new();
        let mut stats = RunStats::default();
        let mut offset = 0;

        let stop = loop {
            let request = FeedRequest {
                offset,
                limit: page_size,
                within_days: self.within_days,
            };
            self.observer.on_event(&SyncEvent::PageRequested {
                offset,
                limit: page_size,
            });

            let entries = match self.fetch_entries(&request).await {
                Ok(entries) => entries,
                Err(e) => {
                    self.observer.on_event(&SyncEvent::PageFailed {
                        offset,
                        error: e.to_string(),
                    });
                    break StopReason::FetchFailed;
                }
            };

            if entries.is_empty() {
                break StopReason::Exhausted;
            }

            let batch = self.process_page(&entries, offset, cutoff, &mut articles);
            stats.absorb(&batch);
            self.observer.on_event(&SyncEvent::BatchProcessed { offset, stats: batch });

            if batch.added == 0 {
                break StopReason::CutoffReached;
            }
            if self.config.stop_on_short_page && entries.len() < page_size {
                break StopReason::ShortPage;
            }

            offset += page_size;
            if offset > max_offset {
                break StopReason::SafetyLimit;
            }

            if !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }
        };

        self.observer.on_event(&SyncEvent::PaginationStopped {
            reason: stop,
            stats,
            total: articles.len(),
        });

        PaginationOutcome { articles, stats, stop }
    }

    async fn fetch_entries(&self, request: &FeedRequest) -> Result<Vec<FeedEntry>> {
        let body = self.source.fetch_page(request).await?;
        parse_feed(&body)
    }

    fn process_page(
        &self,
        entries: &[FeedEntry],
        offset: usize,
        cutoff: DateTime<Utc>,
        articles: &mut ArticleSet,
    ) -> BatchStats {
        let mut batch = BatchStats::default();
        for entry in entries {
            let outcome = self.process_entry(entry, cutoff, articles);
            if let EntryOutcome::Skipped(reason) = outcome {
                self.observer.on_event(&SyncEvent::EntrySkipped { offset, reason });
            }
            batch.record(&outcome);
        }
        batch
    }

    /// Classify one entry, inserting it when it is new.
    pub fn process_entry(
        &self,
        entry: &FeedEntry,
        cutoff: DateTime<Utc>,
        articles: &mut ArticleSet,
    ) -> EntryOutcome {
        let published = match self.extractor.publish_time(entry) {
            Ok(published) => published,
            Err(reason) => return EntryOutcome::Skipped(reason),
        };
        if published.with_timezone(&Utc) < cutoff {
            return EntryOutcome::Stale;
        }

        let identifier = match self.extractor.identifier(entry) {
            Ok(identifier) => identifier,
            Err(reason) => return EntryOutcome::Skipped(reason),
        };
        if articles.contains(&identifier) {
            return EntryOutcome::Duplicate;
        }

        match self.extractor.build(entry, identifier, published) {
            Ok(article) => {
                articles.insert(article);
                EntryOutcome::Added
            }
            Err(reason) => EntryOutcome::Skipped(reason),
        }
    }
}
