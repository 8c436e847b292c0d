//! Typed CRUD over the document store
//!
//! One generic [`Repository`] serves every [`Record`] type; entity-specific
//! queries are added as inherent impls for the concrete record.

use serde_json::Value;
use std::cmp::Ordering;
use std::marker::PhantomData;

use crate::storage::{DocumentStore, StorageError, StorageResult};
use crate::types::{
    Deepening, Fireside, FiresideFamily, Media, Outline, Record, Snippet, Stored,
};

/// Typed view of one collection
pub struct Repository<'s, T, S: ?Sized> {
    store: &'s S,
    _record: PhantomData<fn() -> T>,
}

/// Shorthand for `Repository::new`
pub fn repository<T: Record, S: DocumentStore + ?Sized>(store: &S) -> Repository<'_, T, S> {
    Repository::new(store)
}

impl<'s, T: Record, S: DocumentStore + ?Sized> Repository<'s, T, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub fn find_by_id(&self, id: &str) -> StorageResult<Option<Stored<T>>> {
        self.store
            .find_by_id(T::COLLECTION, id)?
            .map(Stored::from_document)
            .transpose()
    }

    /// Like `find_by_id`, but a missing record is `StorageError::NotFound`
    pub fn get(&self, id: &str) -> StorageResult<Stored<T>> {
        self.find_by_id(id)?
            .ok_or_else(|| StorageError::not_found(T::COLLECTION, id))
    }

    pub fn find_all(&self) -> StorageResult<Vec<Stored<T>>> {
        decode_all(self.store.find_all(T::COLLECTION)?)
    }

    pub fn find_where(
        &self,
        field: &str,
        value: impl Into<Value>,
    ) -> StorageResult<Vec<Stored<T>>> {
        decode_all(self.store.find_by_field(T::COLLECTION, field, &value.into())?)
    }

    pub fn create(&self, record: &T) -> StorageResult<Stored<T>> {
        let doc = self.store.insert(T::COLLECTION, encode(record)?)?;
        Stored::from_document(doc)
    }

    pub fn update(&self, id: &str, record: &T) -> StorageResult<Stored<T>> {
        let doc = self.store.update(T::COLLECTION, id, encode(record)?)?;
        Stored::from_document(doc)
    }

    pub fn delete(&self, id: &str) -> StorageResult<bool> {
        self.store.delete(T::COLLECTION, id)
    }
}

fn encode<T: Record>(record: &T) -> StorageResult<Value> {
    serde_json::to_value(record).map_err(|e| StorageError::serialization(e.to_string()))
}

fn decode_all<T: Record>(docs: Vec<crate::storage::Document>) -> StorageResult<Vec<Stored<T>>> {
    docs.into_iter().map(Stored::from_document).collect()
}

impl<S: DocumentStore + ?Sized> Repository<'_, Snippet, S> {
    /// Snippets of a fireside in reading order
    pub fn by_fireside(&self, fireside_id: &str) -> StorageResult<Vec<Stored<Snippet>>> {
        let mut snippets = self.find_where("firesideId", fireside_id)?;
        snippets.sort_by(reading_order);
        Ok(snippets)
    }

    pub fn public_by_fireside(&self, fireside_id: &str) -> StorageResult<Vec<Stored<Snippet>>> {
        let mut snippets = self.by_fireside(fireside_id)?;
        snippets.retain(|s| s.is_public());
        Ok(snippets)
    }
}

impl<S: DocumentStore + ?Sized> Repository<'_, Deepening, S> {
    pub fn by_snippet(&self, snippet_id: &str) -> StorageResult<Vec<Stored<Deepening>>> {
        self.find_where("snippetId", snippet_id)
    }
}

impl<S: DocumentStore + ?Sized> Repository<'_, Fireside, S> {
    pub fn by_family(&self, family_id: &str) -> StorageResult<Vec<Stored<Fireside>>> {
        self.find_where("firesideFamilyId", family_id)
    }

    /// Every fireside, most recent first
    pub fn all_by_date_desc(&self) -> StorageResult<Vec<Stored<Fireside>>> {
        let mut firesides = self.find_all()?;
        firesides.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.name.cmp(&b.name)));
        Ok(firesides)
    }
}

impl<S: DocumentStore + ?Sized> Repository<'_, FiresideFamily, S> {
    pub fn by_uid(&self, uid: &str) -> StorageResult<Vec<Stored<FiresideFamily>>> {
        self.find_where("uid", uid)
    }
}

impl<S: DocumentStore + ?Sized> Repository<'_, Outline, S> {
    pub fn by_user(&self, user_id: &str) -> StorageResult<Vec<Stored<Outline>>> {
        self.find_where("userId", user_id)
    }

    pub fn public(&self) -> StorageResult<Vec<Stored<Outline>>> {
        self.find_where("isPublic", true)
    }
}

impl<S: DocumentStore + ?Sized> Repository<'_, Media, S> {
    /// Media for the given ids, in the given order; unknown ids are skipped
    pub fn by_ids(&self, ids: &[String]) -> StorageResult<Vec<Stored<Media>>> {
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(media) = self.find_by_id(id)? {
                found.push(media);
            }
        }
        Ok(found)
    }
}

/// Natural order, then creation time for ties
fn reading_order(a: &Stored<Snippet>, b: &Stored<Snippet>) -> Ordering {
    a.natural_order
        .total_cmp(&b.natural_order)
        .then_with(|| a.created_at.cmp(&b.created_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Backend, MemoryBackend};
    use crate::types::Visibility;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_snippets_by_fireside_in_natural_order() {
        let backend = MemoryBackend::new();
        let ordered = backend
            .transaction::<_, StorageError, _>(|s| {
                let repo = repository::<Snippet, _>(s);
                repo.create(&Snippet::new("f1", "Second", "b", 2.0))?;
                repo.create(&Snippet::new("f1", "First", "a", 1.0))?;
                repo.create(&Snippet::new("f2", "Other", "c", 0.5))?;
                repo.create(
                    &Snippet::new("f1", "Hidden", "d", 1.5).with_visibility(Visibility::Private),
                )?;

                let all = repo.by_fireside("f1")?;
                let public = repo.public_by_fireside("f1")?;
                Ok((all, public))
            })
            .unwrap();

        let names: Vec<_> = ordered.0.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Hidden", "Second"]);
        let public: Vec<_> = ordered.1.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(public, vec!["First", "Second"]);
    }

    #[test]
    fn test_firesides_newest_first() {
        let backend = MemoryBackend::new();
        let firesides = backend
            .transaction::<_, StorageError, _>(|s| {
                let repo = repository::<Fireside, _>(s);
                repo.create(
                    &Fireside::new("fam", "Why Life?", "purpose")
                        .with_date(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()),
                )?;
                repo.create(
                    &Fireside::new("fam", "The Nature of the Soul", "soul")
                        .with_date(Utc.with_ymd_and_hms(2024, 2, 20, 0, 0, 0).unwrap()),
                )?;
                repo.all_by_date_desc()
            })
            .unwrap();

        assert_eq!(firesides[0].name, "The Nature of the Soul");
        assert_eq!(firesides[1].name, "Why Life?");
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let backend = MemoryBackend::new();
        let err = backend
            .read::<_, StorageError, _>(|s| repository::<Outline, _>(s).get("nope"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_public_outlines_and_media_by_ids() {
        let backend = MemoryBackend::new();
        backend
            .transaction::<_, StorageError, _>(|s| {
                let outlines = repository::<Outline, _>(s);
                let mut shared = Outline::new("u1", "Shared");
                shared.is_public = true;
                outlines.create(&shared)?;
                outlines.create(&Outline::new("u1", "Private"))?;
                outlines.create(&Outline::new("u2", "Other"))?;

                assert_eq!(outlines.public()?.len(), 1);
                assert_eq!(outlines.by_user("u1")?.len(), 2);

                let media = repository::<Media, _>(s);
                let clip = media.create(&Media {
                    name: "Talk".into(),
                    url: "https://example.org/talk.mp3".into(),
                    media_type: "audio".into(),
                })?;
                let found = media.by_ids(&[clip.id.clone(), "missing".into()])?;
                assert_eq!(found.len(), 1);
                assert_eq!(found[0].name, "Talk");
                Ok(())
            })
            .unwrap();
    }
}
