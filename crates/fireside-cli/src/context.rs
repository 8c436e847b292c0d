//! Shared state for command execution: the opened archive and output format

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use fireside_config::{ArchiveConfig, LoggingConfig, StorageConfig};
use fireside_core::Archive;
use fireside_sqlite::{SqliteBackend, SqliteConfig};

use crate::cli::OutputFormat;

pub struct CliContext {
    pub archive: Archive<SqliteBackend>,
    pub format: OutputFormat,
}

impl CliContext {
    pub fn open(config: &ArchiveConfig, format: OutputFormat) -> Result<Self> {
        Ok(Self {
            archive: open_archive(&config.storage)?,
            format,
        })
    }

    pub fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

/// Map the user-facing storage section onto connection settings
pub fn sqlite_config(storage: &StorageConfig) -> SqliteConfig {
    let mut config = SqliteConfig::new(&storage.database_path)
        .with_wal_mode(storage.wal_mode)
        .with_busy_timeout(storage.busy_timeout_ms);
    config.cache_size = storage.cache_size;
    config
}

/// Open (creating if needed) the archive database
pub fn open_archive(storage: &StorageConfig) -> Result<Archive<SqliteBackend>> {
    let config = sqlite_config(storage);

    if !config.is_memory() {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }
    }

    let backend = SqliteBackend::open(config.clone())
        .with_context(|| format!("Failed to open database {}", config.path.display()))?;
    info!(path = %config.path.display(), "Opened archive");
    Ok(Archive::new(backend))
}

/// Filter from the configured level plus any extra directives.
///
/// `verbose` raises the base level to debug.
pub fn env_filter(logging: &LoggingConfig, verbose: bool) -> EnvFilter {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        logging.level.parse().unwrap_or(LevelFilter::WARN)
    };

    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(logging.directives.join(","))
}

/// Logs go to stderr so JSON output on stdout stays machine-readable
pub fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(logging, verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sqlite_config_follows_storage_section() {
        let storage = StorageConfig {
            database_path: "/tmp/archive.db".into(),
            wal_mode: false,
            busy_timeout_ms: 250,
            cache_size: -4000,
        };
        let config = sqlite_config(&storage);
        assert_eq!(config.path, std::path::PathBuf::from("/tmp/archive.db"));
        assert!(!config.wal_mode);
        assert_eq!(config.busy_timeout_ms, 250);
        assert_eq!(config.cache_size, -4000);
    }

    #[test]
    fn test_open_archive_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let storage = StorageConfig {
            database_path: dir.path().join("nested").join("fireside.db"),
            ..StorageConfig::default()
        };
        open_archive(&storage).unwrap();
        assert!(dir.path().join("nested").join("fireside.db").exists());
    }

    #[test]
    fn test_env_filter_levels() {
        let logging = LoggingConfig {
            level: "info".into(),
            directives: vec!["fireside_sqlite=trace".into()],
        };
        assert_eq!(env_filter(&logging, false).max_level_hint(), Some(LevelFilter::TRACE));

        let quiet = LoggingConfig::default();
        assert_eq!(env_filter(&quiet, false).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(env_filter(&quiet, true).max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
