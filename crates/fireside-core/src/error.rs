//! Errors surfaced by archive operations

use thiserror::Error;

use crate::storage::StorageError;
use crate::validation::ValidationError;

/// Error type for [`crate::archive::Archive`] operations
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Rejected before any storage interaction
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Looking up or creating a tag failed; nothing was saved
    #[error("Tag resolution failed: {0}")]
    Resolution(#[source] StorageError),

    #[error("{collection} '{id}' not found")]
    NotFound { collection: String, id: String },

    #[error(transparent)]
    Storage(StorageError),

    /// The blocking worker running the operation died
    #[error("Background task failed: {0}")]
    Task(String),
}

/// Result type for archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;

impl ArchiveError {
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Message suitable for an end user; storage details stay in the logs
    pub fn user_message(&self) -> String {
        match self {
            ArchiveError::Validation(err) => err.to_string(),
            ArchiveError::NotFound { collection, .. } => {
                format!("That {} no longer exists", collection)
            }
            ArchiveError::Resolution(_) | ArchiveError::Storage(_) | ArchiveError::Task(_) => {
                "Failed to save. Please try again.".to_string()
            }
        }
    }
}

impl From<StorageError> for ArchiveError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { collection, id } => Self::NotFound { collection, id },
            other => Self::Storage(other),
        }
    }
}
