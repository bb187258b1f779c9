pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::{InMemoryConnector, InMemoryStorage};

#[cfg(feature = "sqlite")]
pub use sqlite::{SQLiteConnector, SQLiteStorage};
