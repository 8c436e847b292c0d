//! Typed records on top of the document store

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

use crate::storage::{Document, StorageResult};
use crate::types::tag::TagReference;
use crate::validation::ValidationError;

/// A record type persisted in its own collection.
///
/// Implemented once per entity; the shared CRUD behaviour lives in
/// [`crate::repository::Repository`].
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection (document type) name
    const COLLECTION: &'static str;

    /// Check required fields before anything is written
    fn validate(&self) -> Result<(), ValidationError>;
}

/// A record that carries tag references and participates in reference counting
pub trait Tagged: Record {
    fn tags(&self) -> &[TagReference];

    fn set_tags(&mut self, tags: Vec<TagReference>);
}

/// A record together with its store-assigned id and timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stored<T> {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: T,
}

impl<T: Record> Stored<T> {
    /// Decode a raw document into a typed record
    pub fn from_document(doc: Document) -> StorageResult<Self> {
        let record = serde_json::from_value(doc.data)?;
        Ok(Self {
            id: doc.id,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
            record,
        })
    }

    pub fn into_inner(self) -> T {
        self.record
    }
}

impl<T> Deref for Stored<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.record
    }
}
