use cg_core::{SyncEvent, SyncObserver};
use std::collections::VecDeque;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Sync observer that writes run events as structured tracing lines, each
/// prefixed with the configured labels (source name, run number, ...).
#[derive(Debug, Clone, Default)]
pub struct Logger {
    prefixes: VecDeque<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            prefixes: VecDeque::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: String) -> Self {
        self.prefixes.push_back(prefix);
        self
    }

    pub fn prefix(&self) -> String {
        self.prefixes.iter().map(|p| format!("{} ", p)).collect::<String>()
    }
}

impl SyncObserver for Logger {
    fn on_event(&self, event: &SyncEvent) {
        let prefix = self.prefix();
        match event {
            SyncEvent::PageRequested { offset, limit } => {
                tracing::info!(offset, limit, "{}Fetching batch", prefix);
            }
            SyncEvent::PageFailed { offset, error } => {
                tracing::error!(offset, %error, "{}Feed page failed, stopping pagination", prefix);
            }
            SyncEvent::EntrySkipped { offset, reason } => {
                tracing::debug!(offset, %reason, "{}Skipped entry", prefix);
            }
            SyncEvent::BatchProcessed { offset, stats } => {
                tracing::info!(
                    offset,
                    entries = stats.entries,
                    added = stats.added,
                    duplicates = stats.duplicates,
                    stale = stats.stale,
                    skipped = stats.skipped,
                    "{}Processed batch",
                    prefix
                );
            }
            SyncEvent::PaginationStopped { reason, stats, total } => {
                tracing::info!(
                    %reason,
                    pages = stats.pages,
                    entries = stats.entries,
                    skipped = stats.skipped,
                    total,
                    "{}Pagination finished",
                    prefix
                );
            }
            SyncEvent::StoreUnavailable { store, error } => {
                tracing::warn!(%store, %error, "{}Database unavailable, skipping sync", prefix);
            }
            SyncEvent::UpsertFailed { identifier, error } => {
                tracing::error!(%identifier, %error, "{}Upsert failed", prefix);
            }
            SyncEvent::StoreSynced { store, upserted, failed } => {
                tracing::info!(%store, upserted, failed, "{}Database sync complete", prefix);
            }
            SyncEvent::SnapshotWritten { location, total } => {
                tracing::info!(%location, total, "{}Saved snapshot", prefix);
            }
            SyncEvent::SnapshotFailed { location, error } => {
                tracing::error!(%location, %error, "{}Snapshot write failed", prefix);
            }
        }
    }
}

/// Installs the global fmt subscriber once. `RUST_LOG` wins over `default`.
pub fn init_logging(default: &str) -> Logger {
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default));
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .try_init();
        });
    }
    Logger::new()
}
