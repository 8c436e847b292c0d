//! Storage component configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the archive database lives and how it is opened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file; `:memory:` for a throwaway archive
    pub database_path: PathBuf,
    pub wal_mode: bool,
    pub busy_timeout_ms: u32,
    /// SQLite `cache_size` pragma
    pub cache_size: i64,
}

impl StorageConfig {
    /// `<data dir>/fireside/fireside.db`, or `./fireside.db` when the
    /// platform has no data directory
    pub fn default_database_path() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join("fireside").join("fireside.db"))
            .unwrap_or_else(|| PathBuf::from("./fireside.db"))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: Self::default_database_path(),
            wal_mode: true,
            busy_timeout_ms: 5000,
            cache_size: -16000,
        }
    }
}
