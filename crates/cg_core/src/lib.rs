pub mod config;
pub mod error;
pub mod feed;
pub mod observer;
pub mod outcome;
pub mod storage;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;

pub use error::{Error, Result};
pub use feed::{FeedRequest, FeedSource};
pub use observer::{NoopObserver, SyncEvent, SyncObserver};
pub use outcome::{BatchStats, EntryOutcome, RunStats, SkipReason, StopReason};
pub use storage::{ArticleStorage, SnapshotSink, StoreConnector, StoredArticle};
pub use types::{Article, ArticleSet, RunMetadata, Snapshot};
