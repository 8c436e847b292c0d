//! Fireside Archive core
//!
//! Content records (firesides, snippets, deepenings, outlines), the storage
//! traits they are persisted through, and the tag workflow that keeps every
//! tag's `reference_count` equal to the number of live references to it.
//!
//! ```rust
//! use fireside_core::{Archive, MemoryBackend, Snippet, TagRequest};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> fireside_core::ArchiveResult<()> {
//! let archive = Archive::new(MemoryBackend::new());
//! archive
//!     .create_snippet(
//!         Snippet::new("fireside-1", "Purpose", "# Why are we here?", 1.0),
//!         vec![TagRequest::named("Purpose").with_weight(8)],
//!     )
//!     .await?;
//!
//! let tag = archive.tag_by_name("purpose").await?.expect("created");
//! assert_eq!(tag.reference_count, 1);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod browse;
pub mod error;
pub mod outline;
pub mod repository;
pub mod storage;
pub mod tagging;
pub mod types;
pub mod validation;

pub use archive::{Archive, SnippetFormData};
pub use browse::{search_snippets, sort_tags, FiresideQuery, FiresideSort, TagSort};
pub use error::{ArchiveError, ArchiveResult};
pub use repository::{repository, Repository};

// Storage abstractions
pub use storage::{
    Backend, Document, DocumentStore, MemoryBackend, Session, StorageError, StorageResult,
    TagStore,
};

pub use tagging::{CountDrift, ReconcileReport, TagDelta, TaggedSave};

pub use types::{
    canonical_name, Deepening, Fireside, FiresideFamily, Media, Outline, OutlineItem,
    OutlineItemKind, Record, Snippet, Stored, Tag, TagId, TagReference, TagRequest, TagTarget,
    Tagged, Visibility, MAX_WEIGHT, MIN_WEIGHT,
};
pub use validation::ValidationError;
