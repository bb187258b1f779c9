use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::types::{Article, Snapshot};
use crate::Result;

/// An article as held by the durable store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArticle {
    pub article: Article,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Insert the article, or on identifier conflict update its title,
    /// content and `updated_at`. `created_at` is never rewritten.
    async fn upsert_article(&self, article: &Article, now: DateTime<Utc>) -> Result<()>;

    /// Look up an article by identifier
    async fn get_article(&self, identifier: &str) -> Result<Option<StoredArticle>>;

    async fn count(&self) -> Result<usize>;

    /// Release the underlying connection.
    async fn close(&self);
}

/// Opens a store for one persist phase.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    fn describe(&self) -> String;

    async fn connect(&self) -> Result<Box<dyn ArticleStorage>>;
}

/// Destination for the full-overwrite snapshot.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    fn location(&self) -> String;

    async fn write_snapshot(&self, snapshot: &Snapshot) -> Result<()>;
}
