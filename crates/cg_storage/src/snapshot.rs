use async_trait::async_trait;
use cg_core::{Result, Snapshot, SnapshotSink};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Writes the snapshot as pretty JSON, replacing the previous file in one
/// rename so readers never see a half-written document.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("snapshot"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotSink for JsonFileSink {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn write_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let body = serde_json::to_vec_pretty(snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, &body).await?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_core::{Article, ArticleSet};
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn articles() -> ArticleSet {
        let mut set = ArticleSet::new();
        set.insert(Article {
            identifier: "one".to_string(),
            title: "First".to_string(),
            author: "The Daily Collegian".to_string(),
            content: "Body".to_string(),
            publish_time: Utc.with_ymd_and_hms(2024, 6, 4, 12, 0, 0).unwrap().fixed_offset(),
            url: "https://news.test/article_one.html".to_string(),
        });
        set
    }

    #[tokio::test]
    async fn test_writes_envelope_and_overwrites() {
        let dir = tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path().join("out").join("articles.json"));

        sink.write_snapshot(&Snapshot::from_set(&ArticleSet::new(), Utc::now()))
            .await
            .unwrap();
        let last_updated = Utc.with_ymd_and_hms(2024, 6, 5, 0, 0, 0).unwrap();
        sink.write_snapshot(&Snapshot::from_set(&articles(), last_updated))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(sink.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["metadata"]["total_articles"], 1);
        assert_eq!(json["metadata"]["last_updated"], "2024-06-05T00:00:00Z");
        let article = &json["articles"][0];
        assert_eq!(article["guid"], "one");
        assert_eq!(article["description"], "Body");
        assert_eq!(article["link"], "https://news.test/article_one.html");
        assert!(article.get("pub_date").is_some());
        assert!(!sink.temp_path().exists());
    }

    #[tokio::test]
    async fn test_unwritable_target_is_an_error() {
        let dir = tempdir().unwrap();
        // The target is an existing directory, so the rename fails.
        let sink = JsonFileSink::new(dir.path());
        let result = sink.write_snapshot(&Snapshot::from_set(&articles(), Utc::now())).await;
        assert!(result.is_err());
        assert!(!sink.temp_path().exists());
    }
}
