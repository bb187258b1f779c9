use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// A normalized feed article.
///
/// Field names on the wire follow the snapshot consumers: `guid`,
/// `description`, `pub_date` and `link`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    #[serde(rename = "guid")]
    pub identifier: String,
    pub title: String,
    pub author: String,
    #[serde(rename = "description")]
    pub content: String,
    #[serde(rename = "pub_date")]
    pub publish_time: DateTime<FixedOffset>,
    #[serde(rename = "link")]
    pub url: String,
}

/// Articles keyed by identifier. The first article inserted under an
/// identifier is the one that is kept.
#[derive(Debug, Clone, Default)]
pub struct ArticleSet {
    articles: HashMap<String, Article>,
}

impl ArticleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the article was new.
    pub fn insert(&mut self, article: Article) -> bool {
        match self.articles.entry(article.identifier.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(article);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.articles.contains_key(identifier)
    }

    pub fn get(&self, identifier: &str) -> Option<&Article> {
        self.articles.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Article> {
        self.articles.values()
    }

    /// Newest first, ties broken by identifier.
    pub fn sorted(&self) -> Vec<&Article> {
        let mut articles: Vec<&Article> = self.articles.values().collect();
        articles.sort_by(|a, b| {
            b.publish_time
                .cmp(&a.publish_time)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        articles
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub last_updated: DateTime<Utc>,
    pub total_articles: usize,
}

/// The document written to the snapshot sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub metadata: RunMetadata,
    pub articles: Vec<Article>,
}

impl Snapshot {
    pub fn from_set(articles: &ArticleSet, last_updated: DateTime<Utc>) -> Self {
        Self {
            metadata: RunMetadata {
                last_updated,
                total_articles: articles.len(),
            },
            articles: articles.sorted().into_iter().cloned().collect(),
        }
    }
}
