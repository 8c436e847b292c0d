//! Backend handles and transactional sessions

use crate::storage::{DocumentStore, StorageError, TagStore};

/// Everything a unit of work can touch: documents and tags
pub trait Session: DocumentStore + TagStore {}

impl<T: DocumentStore + TagStore> Session for T {}

/// An explicitly constructed storage handle.
///
/// Cheap to clone; every clone refers to the same underlying store. Work is
/// synchronous and is expected to run on a blocking thread (see
/// [`crate::archive::Archive`]).
pub trait Backend: Clone + Send + Sync + 'static {
    /// Run `f` against a read-only view.
    fn read<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&dyn Session) -> Result<R, E>,
        E: From<StorageError>;

    /// Run `f` as one atomic unit: commit on `Ok`, roll everything back on `Err`.
    fn transaction<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&dyn Session) -> Result<R, E>,
        E: From<StorageError>;
}
