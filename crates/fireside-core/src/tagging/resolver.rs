//! Tag Resolver: turns submitted tag entries into concrete references

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::storage::{StorageResult, TagStore};
use crate::types::tag::{canonical_name, TagId, TagReference, TagRequest, TagTarget};

/// Resolves names through a [`TagStore`], once per distinct name.
///
/// The name cache lives as long as the resolver, so typing "Soul" twice in
/// one submission creates at most one tag. Counters are never touched here.
pub struct TagResolver<'s, S: ?Sized> {
    store: &'s S,
    by_name: HashMap<String, TagId>,
}

impl<'s, S: TagStore + ?Sized> TagResolver<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            by_name: HashMap::new(),
        }
    }

    /// Resolve a batch in input order.
    ///
    /// Entries that land on an already resolved tag id are dropped; the first
    /// occurrence keeps its weight and distance. Any store failure aborts the
    /// whole batch.
    pub fn resolve(&mut self, requests: &[TagRequest]) -> StorageResult<Vec<TagReference>> {
        let mut seen = HashSet::with_capacity(requests.len());
        let mut references = Vec::with_capacity(requests.len());

        for request in requests {
            let tag_id = match &request.target {
                TagTarget::Existing(id) => id.clone(),
                TagTarget::Named(name) => self.resolve_name(name)?,
            };

            if !seen.insert(tag_id.clone()) {
                debug!(%tag_id, "Dropping duplicate tag entry");
                continue;
            }

            references.push(TagReference {
                tag_id,
                weight: request.weight,
                distance: request.distance,
            });
        }

        Ok(references)
    }

    fn resolve_name(&mut self, name: &str) -> StorageResult<TagId> {
        let key = canonical_name(name);
        if let Some(id) = self.by_name.get(&key) {
            return Ok(id.clone());
        }
        let id = self.store.resolve_or_create(name)?;
        self.by_name.insert(key, id.clone());
        Ok(id)
    }
}

/// Resolve one batch with a fresh resolver
pub fn resolve_tags<S: TagStore + ?Sized>(
    store: &S,
    requests: &[TagRequest],
) -> StorageResult<Vec<TagReference>> {
    TagResolver::new(store).resolve(requests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Backend, MemoryBackend, StorageError};

    #[test]
    fn test_same_name_resolves_once() {
        let backend = MemoryBackend::new();
        let (refs, tags) = backend
            .transaction::<_, StorageError, _>(|s| {
                let refs = resolve_tags(
                    s,
                    &[
                        TagRequest::named("Soul").with_weight(5),
                        TagRequest::named("soul").with_weight(9),
                        TagRequest::named("Soul"),
                    ],
                )?;
                Ok((refs, s.list_tags()?))
            })
            .unwrap();

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "Soul");
        assert_eq!(tags[0].reference_count, 0);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].tag_id, tags[0].id);
        assert_eq!(refs[0].weight, 5);
    }

    #[test]
    fn test_sequential_resolution_is_idempotent() {
        let backend = MemoryBackend::new();
        let first = backend
            .transaction::<_, StorageError, _>(|s| s.resolve_or_create("Purpose"))
            .unwrap();
        let second = backend
            .transaction::<_, StorageError, _>(|s| {
                resolve_tags(s, &[TagRequest::named("PURPOSE")])
            })
            .unwrap();

        assert_eq!(second[0].tag_id, first);
        let count = backend
            .read::<_, StorageError, _>(|s| s.list_tags())
            .unwrap()
            .len();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_existing_id_matching_named_entry_is_deduplicated() {
        let backend = MemoryBackend::new();
        let refs = backend
            .transaction::<_, StorageError, _>(|s| {
                let id = s.resolve_or_create("Creation")?;
                resolve_tags(
                    s,
                    &[
                        TagRequest::existing(id.clone()).with_distance(2),
                        TagRequest::named("Creation"),
                    ],
                )
            })
            .unwrap();

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].distance, 2);
    }

    #[test]
    fn test_order_follows_input() {
        let backend = MemoryBackend::new();
        let names = backend
            .transaction::<_, StorageError, _>(|s| {
                let refs = resolve_tags(
                    s,
                    &[
                        TagRequest::named("Tests"),
                        TagRequest::named("Afterlife"),
                        TagRequest::named("Growth"),
                    ],
                )?;
                refs.iter()
                    .map(|r| Ok(s.get_tag(&r.tag_id)?.map(|t| t.name).unwrap_or_default()))
                    .collect::<StorageResult<Vec<_>>>()
            })
            .unwrap();

        assert_eq!(names, vec!["Tests", "Afterlife", "Growth"]);
    }

    #[test]
    fn test_store_failure_aborts_batch() {
        let backend = MemoryBackend::new();
        backend.fail_tag_name("Broken");

        let result = backend.transaction::<_, StorageError, _>(|s| {
            resolve_tags(s, &[TagRequest::named("Fine"), TagRequest::named("Broken")])
        });

        assert!(result.is_err());
        let tags = backend.read::<_, StorageError, _>(|s| s.list_tags()).unwrap();
        assert!(tags.is_empty());
    }
}
