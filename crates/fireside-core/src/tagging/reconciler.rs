//! Reference Reconciler: keeps tag counters aligned with live references

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::storage::TagStore;
use crate::types::tag::{TagId, TagReference};

/// Which way a counter moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Adjustment {
    Increment,
    Decrement,
}

/// Counter changes implied by replacing one reference set with another
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDelta {
    pub to_increment: BTreeSet<TagId>,
    pub to_decrement: BTreeSet<TagId>,
}

impl TagDelta {
    /// `next − previous` goes up, `previous − next` goes down; ids in both
    /// sets are left alone.
    pub fn between(previous: &BTreeSet<TagId>, next: &BTreeSet<TagId>) -> Self {
        Self {
            to_increment: next.difference(previous).cloned().collect(),
            to_decrement: previous.difference(next).cloned().collect(),
        }
    }

    /// Same as [`TagDelta::between`] over reference lists
    pub fn from_references(previous: &[TagReference], next: &[TagReference]) -> Self {
        Self::between(&reference_ids(previous), &reference_ids(next))
    }

    pub fn is_empty(&self) -> bool {
        self.to_increment.is_empty() && self.to_decrement.is_empty()
    }

    /// Apply every adjustment, in id order.
    ///
    /// A failed adjustment (typically a tag deleted out of band) is logged
    /// and skipped; the rest of the batch still runs.
    pub fn apply<S: TagStore + ?Sized>(&self, store: &S) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for id in &self.to_increment {
            match store.increment(id) {
                Ok(count) => report.incremented.push((id.clone(), count)),
                Err(err) => {
                    warn!(tag_id = %id, error = %err, "Skipping tag count increment");
                    report.skipped.push(SkippedAdjustment {
                        tag_id: id.clone(),
                        adjustment: Adjustment::Increment,
                        reason: err.to_string(),
                    });
                }
            }
        }

        for id in &self.to_decrement {
            match store.decrement(id) {
                Ok(count) => report.decremented.push((id.clone(), count)),
                Err(err) => {
                    warn!(tag_id = %id, error = %err, "Skipping tag count decrement");
                    report.skipped.push(SkippedAdjustment {
                        tag_id: id.clone(),
                        adjustment: Adjustment::Decrement,
                        reason: err.to_string(),
                    });
                }
            }
        }

        debug!(
            incremented = report.incremented.len(),
            decremented = report.decremented.len(),
            skipped = report.skipped.len(),
            "Reconciled tag counts"
        );
        report
    }
}

/// Distinct tag ids of a reference list
pub fn reference_ids(references: &[TagReference]) -> BTreeSet<TagId> {
    references.iter().map(|r| r.tag_id.clone()).collect()
}

/// An adjustment that could not be applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedAdjustment {
    pub tag_id: TagId,
    pub adjustment: Adjustment,
    pub reason: String,
}

/// Outcome of applying a [`TagDelta`], with the resulting counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub incremented: Vec<(TagId, u32)>,
    pub decremented: Vec<(TagId, u32)>,
    pub skipped: Vec<SkippedAdjustment>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}
