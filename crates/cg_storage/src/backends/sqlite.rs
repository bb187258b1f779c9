use async_trait::async_trait;
use cg_core::{Article, ArticleStorage, Error, Result, StoreConnector, StoredArticle};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        guid TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        author TEXT NOT NULL,
        pub_date TEXT NOT NULL,
        url TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_articles_pub_date ON articles (pub_date)",
];

pub struct SQLiteStorage {
    pool: SqlitePool,
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    Error::Database(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::Database(format!("Failed to connect to database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self { pool })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<chrono::FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .map_err(|e| Error::Database(format!("Failed to parse stored date {:?}: {}", raw, e)))
}

fn stored_from_row(row: &SqliteRow) -> Result<StoredArticle> {
    Ok(StoredArticle {
        article: Article {
            identifier: row.get("guid"),
            title: row.get("title"),
            author: row.get("author"),
            content: row.get("content"),
            publish_time: parse_timestamp(&row.get::<String, _>("pub_date"))?,
            url: row.get("url"),
        },
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?.with_timezone(&Utc),
        updated_at: parse_timestamp(&row.get::<String, _>("updated_at"))?.with_timezone(&Utc),
    })
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    async fn upsert_article(&self, article: &Article, now: DateTime<Utc>) -> Result<()> {
        let now = now.to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO articles
            (guid, title, content, author, pub_date, url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(guid) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&article.identifier)
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.author)
        .bind(article.publish_time.to_rfc3339())
        .bind(&article.url)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to upsert article: {}", e)))?;

        Ok(())
    }

    async fn get_article(&self, identifier: &str) -> Result<Option<StoredArticle>> {
        let row = sqlx::query("SELECT * FROM articles WHERE guid = ?")
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to load article: {}", e)))?;

        row.as_ref().map(stored_from_row).transpose()
    }

    async fn count(&self) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM articles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to count articles: {}", e)))?;
        let total: i64 = row.get("total");
        Ok(total as usize)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Opens `SQLiteStorage` from a file path or a `sqlite:` URL.
pub struct SQLiteConnector {
    path: PathBuf,
}

impl SQLiteConnector {
    pub fn new(location: &str) -> Self {
        let path = location
            .strip_prefix("sqlite://")
            .or_else(|| location.strip_prefix("sqlite:"))
            .unwrap_or(location);
        Self {
            path: PathBuf::from(path),
        }
    }
}

#[async_trait]
impl StoreConnector for SQLiteConnector {
    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    async fn connect(&self) -> Result<Box<dyn ArticleStorage>> {
        let storage = SQLiteStorage::new_with_path(&self.path).await.map_err(|e| {
            Error::Database(format!("SQLite database at {} is unavailable: {}", self.path.display(), e))
        })?;
        Ok(Box::new(storage))
    }
}
