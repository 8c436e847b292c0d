//! Storage Module
//!
//! Trait abstractions for the persistence layer plus an in-memory backend.
//!
//! ## Key Components
//!
//! - **DocumentStore**: CRUD-by-id and equality queries over JSON documents
//! - **TagStore**: tag records and their atomic reference counters
//! - **Session**: what a unit of work sees (both of the above)
//! - **Backend**: an explicitly constructed handle that runs sessions, either
//!   read-only or as one atomic transaction
//!
//! Business logic (resolver, reconciler, repositories) depends only on these
//! traits; `fireside-sqlite` and [`MemoryBackend`] implement them.

pub mod backend;
pub mod document;
pub mod error;
pub mod memory;
pub mod tags;

pub use backend::{Backend, Session};
pub use document::{Document, DocumentStore};
pub use error::{StorageError, StorageResult};
pub use memory::{MemoryBackend, MemoryStats};
pub use tags::TagStore;
