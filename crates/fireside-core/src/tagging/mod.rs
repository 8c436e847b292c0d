//! Tag resolution and reference counting
//!
//! - [`resolver`]: names and ids in, concrete [`crate::types::TagReference`]s out
//! - [`reconciler`]: set difference between old and new references, applied as counter deltas
//! - [`workflow`]: the create/update/delete sequences built from the two
//! - [`recount`]: rebuild every counter from the live references

pub mod reconciler;
pub mod recount;
pub mod resolver;
pub mod workflow;

pub use reconciler::{reference_ids, Adjustment, ReconcileReport, SkippedAdjustment, TagDelta};
pub use recount::{recount_tags, CountDrift};
pub use resolver::{resolve_tags, TagResolver};
pub use workflow::{create_tagged, delete_tagged, update_tagged, TaggedSave};
