//! Rebuild tag counters from the references that actually exist

use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::repository::repository;
use crate::storage::{Session, StorageResult, TagStore};
use crate::tagging::reconciler::reference_ids;
use crate::types::{Deepening, Snippet, TagId, Tagged};

/// A tag whose stored counter disagreed with its live references
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountDrift {
    pub tag_id: TagId,
    pub name: String,
    pub stored: u32,
    pub actual: u32,
}

/// Count live references per tag across snippets and deepenings
pub fn live_reference_counts<S: Session + ?Sized>(
    session: &S,
) -> StorageResult<HashMap<TagId, u32>> {
    let mut counts: HashMap<TagId, u32> = HashMap::new();
    let mut tally = |tags: &[crate::types::TagReference]| {
        for id in reference_ids(tags) {
            *counts.entry(id).or_default() += 1;
        }
    };

    for snippet in repository::<Snippet, _>(session).find_all()? {
        tally(snippet.tags());
    }
    for deepening in repository::<Deepening, _>(session).find_all()? {
        tally(deepening.tags());
    }
    Ok(counts)
}

/// Overwrite every drifted counter with the live count.
///
/// References to tags that no longer exist are reported in the log only.
pub fn recount_tags<S: Session + ?Sized>(session: &S) -> StorageResult<Vec<CountDrift>> {
    let mut live = live_reference_counts(session)?;
    let mut drifted = Vec::new();

    for tag in session.list_tags()? {
        let actual = live.remove(&tag.id).unwrap_or(0);
        if actual != tag.reference_count {
            session.set_reference_count(&tag.id, actual)?;
            drifted.push(CountDrift {
                tag_id: tag.id,
                name: tag.name,
                stored: tag.reference_count,
                actual,
            });
        }
    }

    for (tag_id, references) in &live {
        warn!(%tag_id, references, "References point at a tag that does not exist");
    }

    info!(drifted = drifted.len(), "Recounted tag references");
    Ok(drifted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArchiveError;
    use crate::storage::{Backend, MemoryBackend, TagStore};
    use crate::tagging::workflow::create_tagged;
    use crate::types::TagRequest;

    #[test]
    fn test_recount_repairs_drift() {
        let backend = MemoryBackend::new();
        let drift = backend
            .transaction::<_, ArchiveError, _>(|s| {
                let saved = create_tagged(
                    s,
                    Snippet::new("f1", "S", "t", 1.0),
                    &[TagRequest::named("Soul"), TagRequest::named("Growth")],
                )?;
                create_tagged(
                    s,
                    Deepening::new(&saved.stored.id, "D", "t"),
                    &[TagRequest::named("Soul")],
                )?;

                let soul = s.find_tag_by_name("soul")?.unwrap();
                s.set_reference_count(&soul.id, 7)?;
                let orphan = s.create_tag("Orphan")?;
                s.increment(&orphan.id)?;

                Ok(recount_tags(s)?)
            })
            .unwrap();

        let mut summary: Vec<_> = drift
            .iter()
            .map(|d| (d.name.as_str(), d.stored, d.actual))
            .collect();
        summary.sort();
        assert_eq!(summary, vec![("Orphan", 1, 0), ("Soul", 7, 2)]);

        let again = backend
            .transaction::<_, ArchiveError, _>(|s| Ok(recount_tags(s)?))
            .unwrap();
        assert!(again.is_empty());
    }
}
