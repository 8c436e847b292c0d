//! SQLite connection settings

use std::path::{Path, PathBuf};

/// Connection and pragma settings for [`crate::SqlitePool`]
#[derive(Debug, Clone, PartialEq)]
pub struct SqliteConfig {
    /// Database file, or `:memory:`
    pub path: PathBuf,
    pub wal_mode: bool,
    pub foreign_keys: bool,
    pub busy_timeout_ms: u32,
    /// Negative values are KiB, positive values are pages
    pub cache_size: i64,
    /// Bytes of memory-mapped I/O; 0 disables it
    pub mmap_size: u64,
}

impl SqliteConfig {
    /// File database with the default pragmas
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Private in-memory database, mostly for tests
    pub fn memory() -> Self {
        Self {
            path: PathBuf::from(":memory:"),
            wal_mode: false,
            mmap_size: 0,
            ..Self::default()
        }
    }

    pub fn is_memory(&self) -> bool {
        self.path.to_str() == Some(":memory:")
    }

    pub fn with_busy_timeout(mut self, ms: u32) -> Self {
        self.busy_timeout_ms = ms;
        self
    }

    pub fn with_wal_mode(mut self, enabled: bool) -> Self {
        self.wal_mode = enabled;
        self
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./fireside.db"),
            wal_mode: true,
            foreign_keys: true,
            busy_timeout_ms: 5000,
            cache_size: -16000,
            mmap_size: 64 * 1024 * 1024,
        }
    }
}
