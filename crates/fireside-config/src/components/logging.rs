//! Logging configuration

use serde::{Deserialize, Serialize};

/// Log levels accepted in the config file and `FIRESIDE_LOG_LEVEL`
pub const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`
    pub level: String,
    /// Extra `tracing` directives, e.g. `fireside_sqlite=debug`
    pub directives: Vec<String>,
}

impl LoggingConfig {
    pub fn is_valid_level(level: &str) -> bool {
        LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            directives: Vec::new(),
        }
    }
}
