//! Async archive service
//!
//! [`Archive`] is what callers hold. Every operation validates its input up
//! front, then runs its storage work on the blocking pool as a single
//! [`Backend::transaction`] (or [`Backend::read`] for queries).

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ArchiveError, ArchiveResult};
use crate::repository::repository;
use crate::storage::{Backend, Session, TagStore};
use crate::tagging::{self, CountDrift, ReconcileReport, TaggedSave};
use crate::types::{
    Deepening, Fireside, FiresideFamily, Media, Outline, Record, Snippet, Stored, Tag, TagId,
    TagRequest, Tagged,
};
use crate::validation::validate_tag_requests;

/// Everything the snippet editor needs before the user types anything
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetFormData {
    pub firesides: Vec<Stored<Fireside>>,
    pub tags: Vec<Tag>,
}

/// Archive service over an explicitly constructed backend
#[derive(Clone)]
pub struct Archive<B: Backend> {
    backend: B,
}

impl<B: Backend> Archive<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run `f` as one transaction on the blocking pool
    async fn write<R, F>(&self, f: F) -> ArchiveResult<R>
    where
        F: FnOnce(&dyn Session) -> ArchiveResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let backend = self.backend.clone();
        tokio::task::spawn_blocking(move || backend.transaction(f))
            .await
            .map_err(|e| ArchiveError::Task(e.to_string()))?
    }

    async fn read<R, F>(&self, f: F) -> ArchiveResult<R>
    where
        F: FnOnce(&dyn Session) -> ArchiveResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let backend = self.backend.clone();
        tokio::task::spawn_blocking(move || backend.read(f))
            .await
            .map_err(|e| ArchiveError::Task(e.to_string()))?
    }

    // ------------------------------------------------------------------
    // Tagged records
    // ------------------------------------------------------------------

    async fn create_tagged<T: Tagged>(
        &self,
        record: T,
        requests: Vec<TagRequest>,
    ) -> ArchiveResult<TaggedSave<T>> {
        record.validate()?;
        validate_tag_requests(&requests)?;
        self.write(move |s| tagging::create_tagged(s, record, &requests))
            .await
    }

    async fn update_tagged<T: Tagged>(
        &self,
        id: &str,
        record: T,
        requests: Vec<TagRequest>,
    ) -> ArchiveResult<TaggedSave<T>> {
        record.validate()?;
        validate_tag_requests(&requests)?;
        let id = id.to_string();
        self.write(move |s| tagging::update_tagged(s, &id, record, &requests))
            .await
    }

    async fn delete_tagged<T: Tagged>(&self, id: &str) -> ArchiveResult<ReconcileReport> {
        let id = id.to_string();
        self.write(move |s| tagging::delete_tagged::<T, _>(s, &id))
            .await
    }

    pub async fn create_snippet(
        &self,
        snippet: Snippet,
        tags: Vec<TagRequest>,
    ) -> ArchiveResult<TaggedSave<Snippet>> {
        self.create_tagged(snippet, tags).await
    }

    /// Replace a snippet; its tags become exactly `tags`
    pub async fn update_snippet(
        &self,
        id: &str,
        snippet: Snippet,
        tags: Vec<TagRequest>,
    ) -> ArchiveResult<TaggedSave<Snippet>> {
        self.update_tagged(id, snippet, tags).await
    }

    /// Delete a snippet. Its deepenings are kept.
    pub async fn delete_snippet(&self, id: &str) -> ArchiveResult<ReconcileReport> {
        self.delete_tagged::<Snippet>(id).await
    }

    pub async fn create_deepening(
        &self,
        deepening: Deepening,
        tags: Vec<TagRequest>,
    ) -> ArchiveResult<TaggedSave<Deepening>> {
        self.create_tagged(deepening, tags).await
    }

    pub async fn update_deepening(
        &self,
        id: &str,
        deepening: Deepening,
        tags: Vec<TagRequest>,
    ) -> ArchiveResult<TaggedSave<Deepening>> {
        self.update_tagged(id, deepening, tags).await
    }

    pub async fn delete_deepening(&self, id: &str) -> ArchiveResult<ReconcileReport> {
        self.delete_tagged::<Deepening>(id).await
    }

    // ------------------------------------------------------------------
    // Untagged records
    // ------------------------------------------------------------------

    async fn create_record<T: Record>(&self, record: T) -> ArchiveResult<Stored<T>> {
        record.validate()?;
        let stored = self
            .write(move |s| Ok(repository::<T, _>(s).create(&record)?))
            .await?;
        info!(collection = T::COLLECTION, id = %stored.id, "Created record");
        Ok(stored)
    }

    async fn update_record<T: Record>(&self, id: &str, record: T) -> ArchiveResult<Stored<T>> {
        record.validate()?;
        let id = id.to_string();
        self.write(move |s| Ok(repository::<T, _>(s).update(&id, &record)?))
            .await
    }

    async fn delete_record<T: Record>(&self, id: &str) -> ArchiveResult<bool> {
        let id = id.to_string();
        let deleted = self
            .write(move |s| Ok(repository::<T, _>(s).delete(&id)?))
            .await?;
        debug!(collection = T::COLLECTION, deleted, "Deleted record");
        Ok(deleted)
    }

    pub async fn create_family(
        &self,
        family: FiresideFamily,
    ) -> ArchiveResult<Stored<FiresideFamily>> {
        self.create_record(family).await
    }

    pub async fn update_family(
        &self,
        id: &str,
        family: FiresideFamily,
    ) -> ArchiveResult<Stored<FiresideFamily>> {
        self.update_record(id, family).await
    }

    pub async fn delete_family(&self, id: &str) -> ArchiveResult<bool> {
        self.delete_record::<FiresideFamily>(id).await
    }

    pub async fn create_fireside(&self, fireside: Fireside) -> ArchiveResult<Stored<Fireside>> {
        self.create_record(fireside).await
    }

    pub async fn update_fireside(
        &self,
        id: &str,
        fireside: Fireside,
    ) -> ArchiveResult<Stored<Fireside>> {
        self.update_record(id, fireside).await
    }

    pub async fn delete_fireside(&self, id: &str) -> ArchiveResult<bool> {
        self.delete_record::<Fireside>(id).await
    }

    pub async fn create_outline(&self, outline: Outline) -> ArchiveResult<Stored<Outline>> {
        self.create_record(outline).await
    }

    pub async fn update_outline(
        &self,
        id: &str,
        outline: Outline,
    ) -> ArchiveResult<Stored<Outline>> {
        self.update_record(id, outline).await
    }

    pub async fn delete_outline(&self, id: &str) -> ArchiveResult<bool> {
        self.delete_record::<Outline>(id).await
    }

    pub async fn create_media(&self, media: Media) -> ArchiveResult<Stored<Media>> {
        self.create_record(media).await
    }

    pub async fn delete_media(&self, id: &str) -> ArchiveResult<bool> {
        self.delete_record::<Media>(id).await
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Any record by id; a missing id is `ArchiveError::NotFound`
    pub async fn get<T: Record>(&self, id: &str) -> ArchiveResult<Stored<T>> {
        let id = id.to_string();
        self.read(move |s| Ok(repository::<T, _>(s).get(&id)?)).await
    }

    /// Every record of one type, oldest first
    pub async fn list<T: Record>(&self) -> ArchiveResult<Vec<Stored<T>>> {
        self.read(|s| Ok(repository::<T, _>(s).find_all()?)).await
    }

    /// Snippets of a fireside in reading order, optionally only public ones
    pub async fn snippets_by_fireside(
        &self,
        fireside_id: &str,
        public_only: bool,
    ) -> ArchiveResult<Vec<Stored<Snippet>>> {
        let fireside_id = fireside_id.to_string();
        self.read(move |s| {
            let repo = repository::<Snippet, _>(s);
            let snippets = if public_only {
                repo.public_by_fireside(&fireside_id)?
            } else {
                repo.by_fireside(&fireside_id)?
            };
            Ok(snippets)
        })
        .await
    }

    pub async fn deepenings_by_snippet(
        &self,
        snippet_id: &str,
    ) -> ArchiveResult<Vec<Stored<Deepening>>> {
        let snippet_id = snippet_id.to_string();
        self.read(move |s| Ok(repository::<Deepening, _>(s).by_snippet(&snippet_id)?))
            .await
    }

    /// All firesides, newest first
    pub async fn firesides(&self) -> ArchiveResult<Vec<Stored<Fireside>>> {
        self.read(|s| Ok(repository::<Fireside, _>(s).all_by_date_desc()?))
            .await
    }

    pub async fn firesides_by_family(
        &self,
        family_id: &str,
    ) -> ArchiveResult<Vec<Stored<Fireside>>> {
        let family_id = family_id.to_string();
        self.read(move |s| Ok(repository::<Fireside, _>(s).by_family(&family_id)?))
            .await
    }

    pub async fn family_by_uid(&self, uid: &str) -> ArchiveResult<Option<Stored<FiresideFamily>>> {
        let uid = uid.to_string();
        self.read(move |s| {
            Ok(repository::<FiresideFamily, _>(s)
                .by_uid(&uid)?
                .into_iter()
                .next())
        })
        .await
    }

    pub async fn outlines_by_user(&self, user_id: &str) -> ArchiveResult<Vec<Stored<Outline>>> {
        let user_id = user_id.to_string();
        self.read(move |s| Ok(repository::<Outline, _>(s).by_user(&user_id)?))
            .await
    }

    pub async fn public_outlines(&self) -> ArchiveResult<Vec<Stored<Outline>>> {
        self.read(|s| Ok(repository::<Outline, _>(s).public()?)).await
    }

    pub async fn media_by_ids(&self, ids: Vec<String>) -> ArchiveResult<Vec<Stored<Media>>> {
        self.read(move |s| Ok(repository::<Media, _>(s).by_ids(&ids)?))
            .await
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    /// All tags, sorted by name
    pub async fn tags(&self) -> ArchiveResult<Vec<Tag>> {
        self.read(|s| Ok(s.list_tags()?)).await
    }

    /// Case-insensitive lookup
    pub async fn tag_by_name(&self, name: &str) -> ArchiveResult<Option<Tag>> {
        let name = name.to_string();
        self.read(move |s| Ok(s.find_tag_by_name(&name)?)).await
    }

    pub async fn tag(&self, id: &TagId) -> ArchiveResult<Tag> {
        let id = id.clone();
        self.read(move |s| {
            s.get_tag(&id)?
                .ok_or_else(|| ArchiveError::not_found("tag", id.as_str()))
        })
        .await
    }

    /// Remove a tag record. References to it stay on their entities and are
    /// skipped by later count adjustments.
    pub async fn delete_tag(&self, id: &TagId) -> ArchiveResult<bool> {
        let id = id.clone();
        let deleted = self.write(move |s| Ok(s.delete_tag(&id)?)).await?;
        info!(deleted, "Deleted tag");
        Ok(deleted)
    }

    /// Recompute every counter from the live references
    pub async fn recount_tags(&self) -> ArchiveResult<Vec<CountDrift>> {
        self.write(|s| Ok(tagging::recount_tags(s)?)).await
    }

    /// Firesides and tags, fetched concurrently
    pub async fn snippet_form_data(&self) -> ArchiveResult<SnippetFormData> {
        let (firesides, tags) = tokio::try_join!(self.firesides(), self.tags())?;
        Ok(SnippetFormData { firesides, tags })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use crate::validation::ValidationError;

    #[tokio::test]
    async fn test_create_snippet_counts_tags() {
        let archive = Archive::new(MemoryBackend::new());
        let saved = archive
            .create_snippet(
                Snippet::new("f1", "Purpose", "# Why", 1.0),
                vec![TagRequest::named("Purpose").with_weight(8)],
            )
            .await
            .unwrap();

        assert_eq!(saved.stored.tags.len(), 1);
        assert_eq!(saved.stored.tags[0].weight, 8);
        let tag = archive.tag_by_name("purpose").await.unwrap().unwrap();
        assert_eq!(tag.reference_count, 1);
    }

    #[tokio::test]
    async fn test_invalid_weight_is_rejected_before_storage() {
        let backend = MemoryBackend::new();
        let archive = Archive::new(backend.clone());
        let err = archive
            .create_snippet(
                Snippet::new("f1", "S", "t", 1.0),
                vec![TagRequest::named("Soul").with_weight(0)],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ArchiveError::Validation(ValidationError::OutOfRange { .. })));
        assert_eq!(backend.stats().operations(), 0);
        assert_eq!(backend.stats().commits(), 0);
    }

    #[tokio::test]
    async fn test_get_missing_record() {
        let archive = Archive::new(MemoryBackend::new());
        let err = archive.get::<Fireside>("missing").await.unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::NotFound { ref collection, .. } if collection == "fireside"
        ));
    }

    #[tokio::test]
    async fn test_snippet_form_data() {
        let archive = Archive::new(MemoryBackend::new());
        archive
            .create_fireside(Fireside::new("fam", "Why Life?", "purpose"))
            .await
            .unwrap();
        archive
            .create_snippet(Snippet::new("f1", "S", "t", 1.0), vec![TagRequest::named("Soul")])
            .await
            .unwrap();

        let data = archive.snippet_form_data().await.unwrap();
        assert_eq!(data.firesides.len(), 1);
        assert_eq!(data.tags.len(), 1);
        assert_eq!(data.tags[0].name, "Soul");
    }
}
