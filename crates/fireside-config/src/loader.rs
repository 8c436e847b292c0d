//! Layered configuration loading

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::components::{LoggingConfig, StorageConfig};
use crate::error::{ConfigError, ConfigResult};

/// Overrides the database path
pub const ENV_DB_PATH: &str = "FIRESIDE_DB_PATH";
/// Overrides the log level
pub const ENV_LOG_LEVEL: &str = "FIRESIDE_LOG_LEVEL";
/// When set, the user's config file is never read
pub const ENV_TEST_MODE: &str = "FIRESIDE_TEST_MODE";

/// Complete archive configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Values given explicitly by the caller (usually CLI flags); highest priority
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl ArchiveConfig {
    /// Load configuration with precedence: defaults < file < env < overrides
    pub fn load(config_file: Option<PathBuf>, overrides: ConfigOverrides) -> ConfigResult<Self> {
        let mut config = Self::from_file_or_default(config_file)?;

        if let Ok(path) = std::env::var(ENV_DB_PATH) {
            config.storage.database_path = PathBuf::from(path);
        }
        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            config.logging.level = level;
        }

        if let Some(path) = overrides.database_path {
            config.storage.database_path = path;
        }
        if let Some(level) = overrides.log_level {
            config.logging.level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Get default config file path
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Invalid("Could not determine config directory".into()))?
            .join("fireside");
        Ok(config_dir.join("config.toml"))
    }

    /// Parse a TOML file; missing keys fall back to defaults
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_file_or_default(config_file: Option<PathBuf>) -> ConfigResult<Self> {
        if std::env::var(ENV_TEST_MODE).is_ok() {
            return Ok(Self::default());
        }

        let path = config_file
            .or_else(|| Self::default_config_path().ok())
            .filter(|p| p.exists());

        match path {
            Some(path) => {
                debug!(path = %path.display(), "Loading config file");
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !LoggingConfig::is_valid_level(&self.logging.level) {
            return Err(ConfigError::Invalid(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }
        if self.storage.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database_path must not be empty".into()));
        }
        Ok(())
    }

    /// Write a commented example file, creating the parent directory
    pub fn create_example(path: &Path) -> ConfigResult<()> {
        let example = r#"# Fireside Archive configuration
# Location: ~/.config/fireside/config.toml

[storage]
# SQLite database file (FIRESIDE_DB_PATH overrides this)
# Default: <data dir>/fireside/fireside.db
database_path = "/home/user/.local/share/fireside/fireside.db"

# Write-ahead logging; leave on unless the file lives on a network share
wal_mode = true

# How long a writer waits for the lock, in milliseconds
busy_timeout_ms = 5000

[logging]
# off, error, warn, info, debug or trace (FIRESIDE_LOG_LEVEL overrides this)
level = "warn"

# Extra tracing directives
# directives = ["fireside_core::tagging=debug"]
"#;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(path, example).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Display the current configuration as TOML
    pub fn display_as_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Display the current configuration as JSON
    pub fn display_as_json(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn clear_env() {
        std::env::remove_var(ENV_DB_PATH);
        std::env::remove_var(ENV_LOG_LEVEL);
        std::env::remove_var(ENV_TEST_MODE);
    }

    #[test]
    #[serial]
    fn test_test_mode_ignores_files() {
        clear_env();
        std::env::set_var(ENV_TEST_MODE, "1");

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

        let config = ArchiveConfig::load(Some(path), ConfigOverrides::default()).unwrap();
        assert_eq!(config, ArchiveConfig::default());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_precedence() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[storage]\ndatabase_path = \"/from/file.db\"\n\n[logging]\nlevel = \"info\"\n",
        )
        .unwrap();

        let config = ArchiveConfig::load(Some(path.clone()), ConfigOverrides::default()).unwrap();
        assert_eq!(config.storage.database_path, PathBuf::from("/from/file.db"));
        assert_eq!(config.logging.level, "info");
        assert!(config.storage.wal_mode);

        std::env::set_var(ENV_DB_PATH, "/from/env.db");
        let config = ArchiveConfig::load(Some(path.clone()), ConfigOverrides::default()).unwrap();
        assert_eq!(config.storage.database_path, PathBuf::from("/from/env.db"));

        let overrides = ConfigOverrides {
            database_path: Some(PathBuf::from("/from/flag.db")),
            log_level: Some("trace".into()),
        };
        let config = ArchiveConfig::load(Some(path), overrides).unwrap();
        assert_eq!(config.storage.database_path, PathBuf::from("/from/flag.db"));
        assert_eq!(config.logging.level, "trace");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_level_rejected() {
        clear_env();
        std::env::set_var(ENV_TEST_MODE, "1");
        let overrides = ConfigOverrides {
            log_level: Some("loud".into()),
            ..Default::default()
        };
        let err = ArchiveConfig::load(None, overrides).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        clear_env();
    }

    #[test]
    fn test_example_file_parses() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        ArchiveConfig::create_example(&path).unwrap();

        let config = ArchiveConfig::from_file(&path).unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.storage.busy_timeout_ms, 5000);
        config.validate().unwrap();
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage\n").unwrap();
        assert!(matches!(
            ArchiveConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_display_round_trips_through_toml() {
        let config = ArchiveConfig::default();
        let rendered = config.display_as_toml().unwrap();
        let parsed: ArchiveConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
        assert!(config.display_as_json().unwrap().contains("\"storage\""));
    }
}
