use cg_core::{Article, ArticleSet, ArticleStorage, Snapshot};
use cg_storage::{DatabaseOutcome, InMemoryConnector, InMemoryStorage, JsonFileSink, SinkWriter};
use chrono::{Duration, TimeZone, Utc};
use tempfile::tempdir;

fn article(id: &str, title: &str, hour: u32) -> Article {
    Article {
        identifier: id.to_string(),
        title: title.to_string(),
        author: "The Daily Collegian".to_string(),
        content: format!("<p>{}</p>", title),
        publish_time: Utc.with_ymd_and_hms(2024, 6, 4, hour, 0, 0).unwrap().fixed_offset(),
        url: format!("https://news.test/news/article_{}.html", id),
    }
}

#[tokio::test]
async fn test_two_runs_upsert_and_overwrite_snapshot() {
    let dir = tempdir().unwrap();
    let snapshot_path = dir.path().join("articles.json");
    let storage = InMemoryStorage::new();
    let writer = SinkWriter::new(
        Some(Box::new(InMemoryConnector::new(storage.clone()))),
        Box::new(JsonFileSink::new(&snapshot_path)),
    );

    let first_run = Utc.with_ymd_and_hms(2024, 6, 4, 20, 0, 0).unwrap();
    let mut first = ArticleSet::new();
    first.insert(article("a1", "Early story", 9));
    first.insert(article("b2", "Later story", 15));
    let report = writer.persist_at(&first, first_run).await.unwrap();
    assert_eq!(report.database, DatabaseOutcome::Synced { upserted: 2, failed: 0 });

    let second_run = first_run + Duration::hours(1);
    let mut second = ArticleSet::new();
    second.insert(article("a1", "Early story, updated", 9));
    let report = writer.persist_at(&second, second_run).await.unwrap();
    assert_eq!(report.total, 1);

    // The store accumulates across runs.
    assert_eq!(storage.count().await.unwrap(), 2);
    let stored = storage.get_article("a1").await.unwrap().unwrap();
    assert_eq!(stored.article.title, "Early story, updated");
    assert_eq!(stored.created_at, first_run);
    assert_eq!(stored.updated_at, second_run);

    // The snapshot reflects only the latest run.
    let snapshot: Snapshot =
        serde_json::from_str(&std::fs::read_to_string(&snapshot_path).unwrap()).unwrap();
    assert_eq!(snapshot.metadata.total_articles, 1);
    assert_eq!(snapshot.metadata.last_updated, second_run);
    assert_eq!(snapshot.articles[0].title, "Early story, updated");
}

#[tokio::test]
async fn test_snapshot_orders_newest_first() {
    let dir = tempdir().unwrap();
    let snapshot_path = dir.path().join("articles.json");
    let writer = SinkWriter::new(None, Box::new(JsonFileSink::new(&snapshot_path)));

    let mut set = ArticleSet::new();
    set.insert(article("old", "Morning", 8));
    set.insert(article("new", "Evening", 18));
    writer.persist(&set).await.unwrap();

    let snapshot: Snapshot =
        serde_json::from_str(&std::fs::read_to_string(&snapshot_path).unwrap()).unwrap();
    let ids: Vec<&str> = snapshot.articles.iter().map(|a| a.identifier.as_str()).collect();
    assert_eq!(ids, vec!["new", "old"]);
}
