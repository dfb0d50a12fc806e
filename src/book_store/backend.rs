use super::{BookStore, GuardedBookStore, JsonFileBookStore, SqliteBookStore};
use anyhow::Result;
use std::path::{Path, PathBuf};

#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Json => write!(f, "json"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl StorageBackend {
    pub fn default_db_path(&self) -> PathBuf {
        match self {
            StorageBackend::Json => PathBuf::from("library.json"),
            StorageBackend::Sqlite => PathBuf::from("library.db"),
        }
    }

    /// Opens the backend at `db_path`, creating it if needed, and puts it
    /// behind the store-wide lock.
    pub fn open(&self, db_path: &Path) -> Result<GuardedBookStore> {
        let store: Box<dyn BookStore> = match self {
            StorageBackend::Json => Box::new(JsonFileBookStore::open(db_path)?),
            StorageBackend::Sqlite => Box::new(SqliteBookStore::new(db_path)?),
        };
        Ok(GuardedBookStore::new(store))
    }
}
