use cg_core::config::{StorageConfig, StorageKind};
use cg_core::{Result, StoreConnector};

pub mod backends;
pub mod snapshot;
pub mod writer;

pub use backends::*;
pub use snapshot::JsonFileSink;
pub use writer::{DatabaseOutcome, PersistReport, SinkWriter};

/// Default SQLite file when no location is configured.
pub const DEFAULT_DATABASE_PATH: &str = "articles.db";

/// Build the connector selected by `config`. `None` means the database
/// mirror is turned off.
pub fn create_connector(config: &StorageConfig) -> Result<Option<Box<dyn StoreConnector>>> {
    match config.kind {
        StorageKind::Disabled => Ok(None),
        StorageKind::Memory => Ok(Some(Box::new(InMemoryConnector::new(InMemoryStorage::new())))),
        StorageKind::Sqlite => sqlite_connector(config),
    }
}

#[cfg(feature = "sqlite")]
fn sqlite_connector(config: &StorageConfig) -> Result<Option<Box<dyn StoreConnector>>> {
    let location = config.url.as_deref().unwrap_or(DEFAULT_DATABASE_PATH);
    Ok(Some(Box::new(SQLiteConnector::new(location))))
}

#[cfg(not(feature = "sqlite"))]
fn sqlite_connector(_config: &StorageConfig) -> Result<Option<Box<dyn StoreConnector>>> {
    Err(cg_core::Error::Config(
        "this build has no SQLite support; use --storage memory or none".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_storage_has_no_connector() {
        let config = StorageConfig {
            kind: StorageKind::Disabled,
            url: None,
        };
        assert!(create_connector(&config).unwrap().is_none());
    }

    #[test]
    fn test_memory_connector() {
        let config = StorageConfig {
            kind: StorageKind::Memory,
            url: None,
        };
        let connector = create_connector(&config).unwrap().unwrap();
        assert_eq!(connector.describe(), "memory://articles");
    }
}
