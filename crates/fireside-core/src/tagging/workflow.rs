//! Save and delete sequences for tagged records
//!
//! resolve → diff → adjust counts → persist, all against one session. Run
//! inside `Backend::transaction` so a failure at any step leaves nothing
//! behind.

use tracing::{debug, info};

use crate::error::{ArchiveError, ArchiveResult};
use crate::repository::repository;
use crate::storage::Session;
use crate::tagging::reconciler::{ReconcileReport, TagDelta};
use crate::tagging::resolver::TagResolver;
use crate::types::{Stored, TagRequest, Tagged};

/// A persisted tagged record plus what happened to the counters
#[derive(Debug, Clone)]
pub struct TaggedSave<T> {
    pub stored: Stored<T>,
    pub report: ReconcileReport,
}

/// Create a tagged record; every resolved tag is counted once
pub fn create_tagged<T, S>(
    session: &S,
    mut record: T,
    requests: &[TagRequest],
) -> ArchiveResult<TaggedSave<T>>
where
    T: Tagged,
    S: Session + ?Sized,
{
    let references = TagResolver::new(session)
        .resolve(requests)
        .map_err(ArchiveError::Resolution)?;

    let report = TagDelta::from_references(&[], &references).apply(session);
    record.set_tags(references);

    let stored = repository::<T, _>(session).create(&record)?;
    info!(
        collection = T::COLLECTION,
        id = %stored.id,
        tags = stored.tags().len(),
        "Created tagged record"
    );
    Ok(TaggedSave { stored, report })
}

/// Replace a tagged record, diffing its new tags against the persisted ones
pub fn update_tagged<T, S>(
    session: &S,
    id: &str,
    mut record: T,
    requests: &[TagRequest],
) -> ArchiveResult<TaggedSave<T>>
where
    T: Tagged,
    S: Session + ?Sized,
{
    let repo = repository::<T, _>(session);
    let previous = repo
        .find_by_id(id)?
        .ok_or_else(|| ArchiveError::not_found(T::COLLECTION, id))?;

    let references = TagResolver::new(session)
        .resolve(requests)
        .map_err(ArchiveError::Resolution)?;

    let delta = TagDelta::from_references(previous.tags(), &references);
    if delta.is_empty() {
        debug!(collection = T::COLLECTION, id, "Tag set unchanged");
    }
    let report = delta.apply(session);
    record.set_tags(references);

    let stored = repo.update(id, &record)?;
    info!(collection = T::COLLECTION, id, "Updated tagged record");
    Ok(TaggedSave { stored, report })
}

/// Delete a tagged record and release every tag it referenced
pub fn delete_tagged<T, S>(session: &S, id: &str) -> ArchiveResult<ReconcileReport>
where
    T: Tagged,
    S: Session + ?Sized,
{
    let repo = repository::<T, _>(session);
    let previous = repo
        .find_by_id(id)?
        .ok_or_else(|| ArchiveError::not_found(T::COLLECTION, id))?;

    let report = TagDelta::from_references(previous.tags(), &[]).apply(session);
    repo.delete(id)?;
    info!(collection = T::COLLECTION, id, "Deleted tagged record");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Backend, MemoryBackend, TagStore};
    use crate::types::{Snippet, TagId};

    fn count(backend: &MemoryBackend, id: &TagId) -> Option<u32> {
        backend
            .read::<_, ArchiveError, _>(|s| Ok(s.get_tag(id)?.map(|t| t.reference_count)))
            .unwrap()
    }

    #[test]
    fn test_update_only_touches_difference() {
        let backend = MemoryBackend::new();
        let saved = backend
            .transaction(|s| {
                create_tagged(
                    s,
                    Snippet::new("f1", "S", "text", 1.0),
                    &[
                        TagRequest::named("A"),
                        TagRequest::named("B"),
                        TagRequest::named("C"),
                    ],
                )
            })
            .unwrap();
        let ids: Vec<TagId> = saved.stored.tags.iter().map(|r| r.tag_id.clone()).collect();

        let updated = backend
            .transaction(|s| {
                update_tagged(
                    s,
                    &saved.stored.id,
                    Snippet::new("f1", "S", "text", 1.0),
                    &[
                        TagRequest::named("B"),
                        TagRequest::named("C"),
                        TagRequest::named("D"),
                    ],
                )
            })
            .unwrap();

        assert_eq!(updated.report.incremented.len(), 1);
        assert_eq!(updated.report.decremented, vec![(ids[0].clone(), 0)]);
        assert_eq!(count(&backend, &ids[0]), Some(0));
        assert_eq!(count(&backend, &ids[1]), Some(1));
        assert_eq!(count(&backend, &ids[2]), Some(1));
        let d = &updated.report.incremented[0].0;
        assert_eq!(count(&backend, d), Some(1));
    }

    #[test]
    fn test_update_missing_record_is_not_found() {
        let backend = MemoryBackend::new();
        let err = backend
            .transaction(|s| update_tagged(s, "nope", Snippet::new("f1", "S", "t", 1.0), &[]))
            .unwrap_err();
        assert!(matches!(err, ArchiveError::NotFound { .. }));
    }

    #[test]
    fn test_failed_persist_rolls_back_counts() {
        let backend = MemoryBackend::new();
        backend.fail_document_writes(true);

        let result = backend.transaction(|s| {
            create_tagged(s, Snippet::new("f1", "S", "t", 1.0), &[TagRequest::named("Soul")])
        });
        assert!(result.is_err());

        let tags = backend
            .read::<_, ArchiveError, _>(|s| Ok(s.list_tags()?))
            .unwrap();
        assert!(tags.is_empty());
    }
}
