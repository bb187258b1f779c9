//! Persists one run's articles: a best-effort database mirror followed by a
//! snapshot write that must succeed.

use cg_core::{
    ArticleSet, NoopObserver, Result, Snapshot, SnapshotSink, StoreConnector, SyncEvent,
    SyncObserver,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DatabaseOutcome {
    Skipped { reason: String },
    Synced { upserted: usize, failed: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistReport {
    pub database: DatabaseOutcome,
    pub snapshot: String,
    pub total: usize,
}

pub struct SinkWriter {
    connector: Option<Box<dyn StoreConnector>>,
    sink: Box<dyn SnapshotSink>,
    observer: Arc<dyn SyncObserver>,
}

impl SinkWriter {
    pub fn new(connector: Option<Box<dyn StoreConnector>>, sink: Box<dyn SnapshotSink>) -> Self {
        Self {
            connector,
            sink,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SyncObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub async fn persist(&self, articles: &ArticleSet) -> Result<PersistReport> {
        self.persist_at(articles, Utc::now()).await
    }

    /// Like [`persist`](Self::persist) with an explicit clock.
    pub async fn persist_at(&self, articles: &ArticleSet, now: DateTime<Utc>) -> Result<PersistReport> {
        let database = self.sync_database(articles, now).await;

        let snapshot = Snapshot::from_set(articles, now);
        let location = self.sink.location();
        if let Err(e) = self.sink.write_snapshot(&snapshot).await {
            self.observer.on_event(&SyncEvent::SnapshotFailed {
                location,
                error: e.to_string(),
            });
            return Err(e);
        }
        self.observer.on_event(&SyncEvent::SnapshotWritten {
            location: location.clone(),
            total: snapshot.metadata.total_articles,
        });

        Ok(PersistReport {
            database,
            snapshot: location,
            total: articles.len(),
        })
    }

    async fn sync_database(&self, articles: &ArticleSet, now: DateTime<Utc>) -> DatabaseOutcome {
        let Some(connector) = &self.connector else {
            return DatabaseOutcome::Skipped {
                reason: "database disabled".to_string(),
            };
        };

        let store = connector.describe();
        let storage = match connector.connect().await {
            Ok(storage) => storage,
            Err(e) => {
                self.observer.on_event(&SyncEvent::StoreUnavailable {
                    store,
                    error: e.to_string(),
                });
                return DatabaseOutcome::Skipped {
                    reason: e.to_string(),
                };
            }
        };

        let mut upserted = 0;
        let mut failed = 0;
        for article in articles.sorted() {
            match storage.upsert_article(article, now).await {
                Ok(()) => upserted += 1,
                Err(e) => {
                    failed += 1;
                    self.observer.on_event(&SyncEvent::UpsertFailed {
                        identifier: article.identifier.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        storage.close().await;

        self.observer.on_event(&SyncEvent::StoreSynced {
            store,
            upserted,
            failed,
        });
        DatabaseOutcome::Synced { upserted, failed }
    }
}
