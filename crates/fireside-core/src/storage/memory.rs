//! In-memory backend
//!
//! Used by tests and for throwaway archives. Behaves like the SQLite backend:
//! transactions are serialized behind one mutex and either commit as a whole
//! or restore the state they started from.
//!
//! Supports error injection so tests can exercise the failure paths:
//!
//! ```rust
//! use fireside_core::storage::{Backend, MemoryBackend, StorageError, TagStore};
//!
//! let backend = MemoryBackend::new();
//! backend.fail_tag_name("Broken");
//!
//! let result: Result<_, StorageError> =
//!     backend.transaction(|s| s.resolve_or_create("broken"));
//! assert!(result.is_err());
//! ```

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

use crate::storage::{
    Backend, Document, DocumentStore, Session, StorageError, StorageResult, TagStore,
};
use crate::types::tag::{canonical_name, Tag, TagId};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    documents: BTreeMap<String, Vec<Document>>,
    tags: BTreeMap<TagId, Tag>,
}

#[derive(Debug, Clone, Default)]
struct FailurePlan {
    /// Canonical names whose creation fails
    tag_names: HashSet<String>,
    /// Fail every document insert/update/delete
    document_writes: bool,
}

/// Operation counters for test assertions
#[derive(Debug, Default)]
pub struct MemoryStats {
    operations: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

impl MemoryStats {
    /// Storage calls made through any session
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

/// Shared in-memory store
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
    failures: Arc<Mutex<FailurePlan>>,
    stats: Arc<MemoryStats>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make creation of a tag with this name (any casing) fail
    pub fn fail_tag_name(&self, name: &str) {
        self.failures.lock().tag_names.insert(canonical_name(name));
    }

    /// Make every document write fail until cleared
    pub fn fail_document_writes(&self, fail: bool) {
        self.failures.lock().document_writes = fail;
    }

    pub fn stats(&self) -> &MemoryStats {
        &self.stats
    }

    fn run<R, E, F>(&self, f: F, commit: bool) -> Result<R, E>
    where
        F: FnOnce(&dyn Session) -> Result<R, E>,
        E: From<StorageError>,
    {
        let mut guard = self.state.lock();
        let failures = self.failures.lock().clone();
        let session = MemorySession {
            state: RefCell::new(guard.clone()),
            failures,
            stats: &self.stats,
        };

        let result = f(&session);
        match result {
            Ok(value) => {
                if commit {
                    *guard = session.state.into_inner();
                    self.stats.commits.fetch_add(1, Ordering::SeqCst);
                }
                Ok(value)
            }
            Err(err) => {
                if commit {
                    self.stats.rollbacks.fetch_add(1, Ordering::SeqCst);
                    trace!("Memory transaction rolled back");
                }
                Err(err)
            }
        }
    }
}

impl Backend for MemoryBackend {
    fn read<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&dyn Session) -> Result<R, E>,
        E: From<StorageError>,
    {
        self.run(f, false)
    }

    fn transaction<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&dyn Session) -> Result<R, E>,
        E: From<StorageError>,
    {
        self.run(f, true)
    }
}

/// Working copy handed to one unit of work
struct MemorySession<'a> {
    state: RefCell<MemoryState>,
    failures: FailurePlan,
    stats: &'a MemoryStats,
}

impl MemorySession<'_> {
    fn touch(&self) {
        self.stats.operations.fetch_add(1, Ordering::SeqCst);
    }

    fn check_document_write(&self) -> StorageResult<()> {
        if self.failures.document_writes {
            return Err(StorageError::backend("injected document write failure"));
        }
        Ok(())
    }

    fn adjust(&self, id: &TagId, apply: impl FnOnce(u32) -> u32) -> StorageResult<u32> {
        self.touch();
        let mut state = self.state.borrow_mut();
        let tag = state
            .tags
            .get_mut(id)
            .ok_or_else(|| StorageError::not_found("tag", id.as_str()))?;
        tag.reference_count = apply(tag.reference_count);
        tag.updated_at = Utc::now();
        Ok(tag.reference_count)
    }
}

impl DocumentStore for MemorySession<'_> {
    fn find_by_id(&self, collection: &str, id: &str) -> StorageResult<Option<Document>> {
        self.touch();
        let state = self.state.borrow();
        Ok(state
            .documents
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StorageResult<Vec<Document>> {
        self.touch();
        let state = self.state.borrow();
        Ok(state
            .documents
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| d.field(field).unwrap_or(&Value::Null) == value)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn find_all(&self, collection: &str) -> StorageResult<Vec<Document>> {
        self.touch();
        let state = self.state.borrow();
        Ok(state.documents.get(collection).cloned().unwrap_or_default())
    }

    fn insert(&self, collection: &str, data: Value) -> StorageResult<Document> {
        self.touch();
        self.check_document_write()?;
        let doc = Document::new(collection, data);
        self.state
            .borrow_mut()
            .documents
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    fn update(&self, collection: &str, id: &str, data: Value) -> StorageResult<Document> {
        self.touch();
        self.check_document_write()?;
        let mut state = self.state.borrow_mut();
        let doc = state
            .documents
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| StorageError::not_found(collection, id))?;
        doc.data = data;
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    fn delete(&self, collection: &str, id: &str) -> StorageResult<bool> {
        self.touch();
        self.check_document_write()?;
        let mut state = self.state.borrow_mut();
        let Some(docs) = state.documents.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| d.id != id);
        Ok(docs.len() != before)
    }
}

impl TagStore for MemorySession<'_> {
    fn get_tag(&self, id: &TagId) -> StorageResult<Option<Tag>> {
        self.touch();
        Ok(self.state.borrow().tags.get(id).cloned())
    }

    fn find_tag_by_name(&self, name: &str) -> StorageResult<Option<Tag>> {
        self.touch();
        let key = canonical_name(name);
        Ok(self
            .state
            .borrow()
            .tags
            .values()
            .find(|t| t.name_key() == key)
            .cloned())
    }

    fn list_tags(&self) -> StorageResult<Vec<Tag>> {
        self.touch();
        let mut tags: Vec<Tag> = self.state.borrow().tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name_key().cmp(&b.name_key()));
        Ok(tags)
    }

    fn create_tag(&self, name: &str) -> StorageResult<Tag> {
        self.touch();
        let key = canonical_name(name);
        if self.failures.tag_names.contains(&key) {
            return Err(StorageError::backend(format!(
                "injected failure creating tag '{}'",
                name
            )));
        }
        let mut state = self.state.borrow_mut();
        if state.tags.values().any(|t| t.name_key() == key) {
            return Err(StorageError::InvalidOperation(format!(
                "tag '{}' already exists",
                name
            )));
        }
        let tag = Tag::new(name.trim());
        state.tags.insert(tag.id.clone(), tag.clone());
        Ok(tag)
    }

    fn increment(&self, id: &TagId) -> StorageResult<u32> {
        self.adjust(id, |count| count.saturating_add(1))
    }

    fn decrement(&self, id: &TagId) -> StorageResult<u32> {
        self.adjust(id, |count| count.saturating_sub(1))
    }

    fn set_reference_count(&self, id: &TagId, count: u32) -> StorageResult<()> {
        self.adjust(id, |_| count).map(|_| ())
    }

    fn delete_tag(&self, id: &TagId) -> StorageResult<bool> {
        self.touch();
        Ok(self.state.borrow_mut().tags.remove(id).is_some())
    }
}
