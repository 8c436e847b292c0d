//! Storage Error Types
//!
//! Error handling shared by every storage backend (SQLite, in-memory).

use thiserror::Error;

/// Error type for storage operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    /// Record or tag with the given id does not exist
    #[error("Not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Create a not-found error for a record in a collection
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Create a generic backend error
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a deserialization error
    pub fn deserialization<S: Into<String>>(msg: S) -> Self {
        Self::Deserialization(msg.into())
    }

    /// Check if the error means the target row is gone
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            Self::Deserialization(err.to_string())
        } else {
            Self::Serialization(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        assert!(StorageError::not_found("tag", "tag:1").is_not_found());
        assert!(!StorageError::backend("disk full").is_not_found());
    }

    #[test]
    fn test_not_found_message() {
        let err = StorageError::not_found("snippet", "abc");
        assert_eq!(err.to_string(), "Not found: snippet/abc");
    }
}
