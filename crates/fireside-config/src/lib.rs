//! # Fireside configuration
//!
//! Typed settings for the archive, loaded with the precedence
//! defaults < TOML file < environment < explicit overrides.
//!
//! ```rust,no_run
//! use fireside_config::{ArchiveConfig, ConfigOverrides};
//!
//! let config = ArchiveConfig::load(None, ConfigOverrides::default())?;
//! println!("database: {}", config.storage.database_path.display());
//! # Ok::<(), fireside_config::ConfigError>(())
//! ```

pub mod components;
mod error;
mod loader;

pub use components::{LoggingConfig, StorageConfig};
pub use error::{ConfigError, ConfigResult};
pub use loader::{ArchiveConfig, ConfigOverrides, ENV_DB_PATH, ENV_LOG_LEVEL, ENV_TEST_MODE};
