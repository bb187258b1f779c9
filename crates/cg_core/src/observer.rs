use crate::outcome::{BatchStats, RunStats, SkipReason, StopReason};

/// Structured run events emitted by the paginator and the sink writer.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    PageRequested { offset: usize, limit: usize },
    PageFailed { offset: usize, error: String },
    EntrySkipped { offset: usize, reason: SkipReason },
    BatchProcessed { offset: usize, stats: BatchStats },
    PaginationStopped { reason: StopReason, stats: RunStats, total: usize },
    StoreUnavailable { store: String, error: String },
    UpsertFailed { identifier: String, error: String },
    StoreSynced { store: String, upserted: usize, failed: usize },
    SnapshotWritten { location: String, total: usize },
    SnapshotFailed { location: String, error: String },
}

pub trait SyncObserver: Send + Sync {
    fn on_event(&self, event: &SyncEvent);
}

#[derive(Debug, Default)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {
    fn on_event(&self, _event: &SyncEvent) {}
}
