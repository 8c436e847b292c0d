//! Tag Store contract

use tracing::debug;

use crate::storage::StorageResult;
use crate::types::tag::{Tag, TagId};

/// Persistent tag records and their reference counters.
///
/// Name lookups are case-insensitive (see [`crate::types::canonical_name`]).
/// Counter updates are atomic deltas in every backend, never a
/// read-modify-write from the caller's side.
pub trait TagStore {
    /// Get a tag by id
    fn get_tag(&self, id: &TagId) -> StorageResult<Option<Tag>>;

    /// Case-insensitive lookup by name
    fn find_tag_by_name(&self, name: &str) -> StorageResult<Option<Tag>>;

    /// All tags, sorted by name
    fn list_tags(&self) -> StorageResult<Vec<Tag>>;

    /// Create a tag with `reference_count = 0`.
    ///
    /// Fails with `StorageError::InvalidOperation` if the name is taken.
    fn create_tag(&self, name: &str) -> StorageResult<Tag>;

    /// Return the id of the tag with this name, creating it if needed.
    ///
    /// Never changes a counter. Backends with a native upsert override this.
    fn resolve_or_create(&self, name: &str) -> StorageResult<TagId> {
        if let Some(tag) = self.find_tag_by_name(name)? {
            return Ok(tag.id);
        }
        let tag = self.create_tag(name.trim())?;
        debug!(tag_id = %tag.id, name = %tag.name, "Created tag");
        Ok(tag.id)
    }

    /// `reference_count += 1`; returns the new count.
    ///
    /// `StorageError::NotFound` if the tag is gone.
    fn increment(&self, id: &TagId) -> StorageResult<u32>;

    /// `reference_count = max(0, reference_count - 1)`; returns the new count.
    ///
    /// `StorageError::NotFound` if the tag is gone.
    fn decrement(&self, id: &TagId) -> StorageResult<u32>;

    /// Overwrite a counter. Only used when recounting from live references.
    fn set_reference_count(&self, id: &TagId, count: u32) -> StorageResult<()>;

    /// Remove a tag record; references to it are left in place
    fn delete_tag(&self, id: &TagId) -> StorageResult<bool>;
}
