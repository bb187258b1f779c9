use async_trait::async_trait;
use cg_core::{Article, ArticleStorage, Result, StoreConnector, StoredArticle};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local store. Clones share the same map, so a connector can hand
/// out handles that all see one set of rows.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    rows: Arc<RwLock<HashMap<String, StoredArticle>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    async fn upsert_article(&self, article: &Article, now: DateTime<Utc>) -> Result<()> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&article.identifier) {
            Some(existing) => {
                existing.article.title = article.title.clone();
                existing.article.content = article.content.clone();
                existing.updated_at = now;
            }
            None => {
                rows.insert(
                    article.identifier.clone(),
                    StoredArticle {
                        article: article.clone(),
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
        }
        Ok(())
    }

    async fn get_article(&self, identifier: &str) -> Result<Option<StoredArticle>> {
        Ok(self.rows.read().await.get(identifier).cloned())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.rows.read().await.len())
    }

    async fn close(&self) {}
}

pub struct InMemoryConnector {
    storage: InMemoryStorage,
}

impl InMemoryConnector {
    pub fn new(storage: InMemoryStorage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl StoreConnector for InMemoryConnector {
    fn describe(&self) -> String {
        "memory://articles".to_string()
    }

    async fn connect(&self) -> Result<Box<dyn ArticleStorage>> {
        Ok(Box::new(self.storage.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn article(title: &str) -> Article {
        Article {
            identifier: "abc123".to_string(),
            title: title.to_string(),
            author: "Staff".to_string(),
            content: "First draft".to_string(),
            publish_time: Utc.with_ymd_and_hms(2024, 6, 4, 12, 0, 0).unwrap().fixed_offset(),
            url: "https://news.test/article_abc123.html".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_keeps_created_at() {
        let storage = InMemoryStorage::new();
        let first_seen = Utc::now();
        storage.upsert_article(&article("Original"), first_seen).await.unwrap();

        let mut revised = article("Revised");
        revised.content = "Second draft".to_string();
        revised.author = "Someone Else".to_string();
        let later = first_seen + Duration::hours(1);
        storage.upsert_article(&revised, later).await.unwrap();

        let stored = storage.get_article("abc123").await.unwrap().unwrap();
        assert_eq!(stored.article.title, "Revised");
        assert_eq!(stored.article.content, "Second draft");
        assert_eq!(stored.article.author, "Staff");
        assert_eq!(stored.created_at, first_seen);
        assert_eq!(stored.updated_at, later);
        assert_eq!(storage.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_connector_handles_share_rows() {
        let storage = InMemoryStorage::new();
        let connector = InMemoryConnector::new(storage.clone());
        let handle = connector.connect().await.unwrap();
        handle.upsert_article(&article("Shared"), Utc::now()).await.unwrap();
        handle.close().await;
        assert_eq!(storage.count().await.unwrap(), 1);
    }
}
