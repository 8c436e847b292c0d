//! Document persistence contract
//!
//! Records are stored as JSON documents grouped by collection. The store
//! assigns ids and timestamps; callers only ever hand over the record body.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::storage::StorageResult;

/// A raw stored document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub collection: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Document stamped with the current time and a fresh id
    pub fn new(collection: impl Into<String>, data: Value) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            collection: collection.into(),
            data,
            created_at: now,
            updated_at: now,
        }
    }

    /// Top-level field of the body, if present
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}

/// CRUD-by-id and equality queries over document collections.
///
/// Object safe: services receive it as `&dyn Session` inside a backend
/// transaction.
pub trait DocumentStore {
    /// Get a document by id
    fn find_by_id(&self, collection: &str, id: &str) -> StorageResult<Option<Document>>;

    /// All documents whose top-level `field` equals `value`
    fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StorageResult<Vec<Document>>;

    /// Every document in the collection, oldest first
    fn find_all(&self, collection: &str) -> StorageResult<Vec<Document>>;

    /// Insert a new document; id, `created_at` and `updated_at` are assigned here
    fn insert(&self, collection: &str, data: Value) -> StorageResult<Document>;

    /// Replace a document body and refresh `updated_at`.
    ///
    /// Returns `StorageError::NotFound` when the id does not exist.
    fn update(&self, collection: &str, id: &str, data: Value) -> StorageResult<Document>;

    /// Delete a document; returns whether a row was removed
    fn delete(&self, collection: &str, id: &str) -> StorageResult<bool>;
}
