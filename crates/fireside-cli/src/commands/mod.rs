//! One module per command group

pub mod config;
pub mod deepening;
pub mod family;
pub mod fireside;
pub mod outline;
pub mod seed;
pub mod snippet;
pub mod tags;

use anyhow::{Context, Result};
use std::path::Path;

/// Markdown body from `--text` or `--file`
pub(crate) fn read_body(text: Option<String>, file: Option<&Path>) -> Result<Option<String>> {
    match (text, file) {
        (Some(text), _) => Ok(Some(text)),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .map(Some),
        (None, None) => Ok(None),
    }
}
