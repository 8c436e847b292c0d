//! Domain types

pub mod content;
pub mod record;
pub mod tag;

pub use content::{
    Deepening, Fireside, FiresideFamily, Media, Outline, OutlineItem, OutlineItemKind, Snippet,
    Visibility,
};
pub use record::{Record, Stored, Tagged};
pub use tag::{
    canonical_name, Tag, TagId, TagReference, TagRequest, TagTarget, MAX_WEIGHT, MIN_WEIGHT,
};
