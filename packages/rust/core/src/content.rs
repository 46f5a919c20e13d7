//! Content pipeline: topic → article, plus the edit/approve lifecycle.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use topiclens_llm::StructuredGenerator;
use topiclens_shared::{ContentEdit, ContentRecord, ContentStatus, RecordId, Result, TopicLensError};
use topiclens_storage::Storage;

use crate::pipeline::{ProgressReporter, Sources, TopicLocks, validate_topic};

/// Generates articles and tracks their review status.
pub struct ContentOrchestrator {
    storage: Arc<Storage>,
    sources: Arc<Sources>,
    generator: StructuredGenerator,
    min_chars: usize,
    locks: TopicLocks,
}

impl ContentOrchestrator {
    pub fn new(
        storage: Arc<Storage>,
        sources: Arc<Sources>,
        generator: StructuredGenerator,
        min_chars: usize,
    ) -> Self {
        Self {
            storage,
            sources,
            generator,
            min_chars,
            locks: TopicLocks::new(),
        }
    }

    /// Return the stored article for `topic`, generating one on a miss.
    pub async fn generate(&self, topic: &str, progress: &dyn ProgressReporter) -> Result<ContentRecord> {
        let topic = validate_topic(topic)?;
        self.generate_locked(topic, progress)
            .await
            .map_err(|e| TopicLensError::pipeline("content generation", topic, e))
    }

    /// Delete article `id` (if present) and run the full pipeline for
    /// `topic`, bypassing any stored article.
    pub async fn regenerate(
        &self,
        id: &RecordId,
        topic: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<ContentRecord> {
        let topic = validate_topic(topic)?;
        self.regenerate_locked(id, topic, progress)
            .await
            .map_err(|e| TopicLensError::pipeline("content regeneration", topic, e))
    }

    #[instrument(skip_all, fields(topic = %topic))]
    async fn generate_locked(&self, topic: &str, progress: &dyn ProgressReporter) -> Result<ContentRecord> {
        let _guard = self.locks.acquire(topic).await;

        if let Some(cached) = self.storage.find_content_by_topic(topic).await? {
            info!(id = %cached.id, "content cache hit");
            progress.cache_hit(topic);
            return Ok(cached);
        }
        self.compute(topic, progress).await
    }

    #[instrument(skip_all, fields(%id, topic = %topic))]
    async fn regenerate_locked(
        &self,
        id: &RecordId,
        topic: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<ContentRecord> {
        let _guard = self.locks.acquire(topic).await;

        let removed = self.storage.delete_content(id).await?;
        info!(removed, "regenerating content");
        self.compute(topic, progress).await
    }

    /// Gather, generate and persist a new article. Callers hold the topic lock.
    async fn compute(&self, topic: &str, progress: &dyn ProgressReporter) -> Result<ContentRecord> {
        let gathered = self.sources.gather(topic, self.min_chars, progress).await?;

        progress.phase("Generating article");
        let draft = self.generator.generate_content(topic, &gathered.corpus).await;

        let now = Utc::now();
        let record = ContentRecord {
            id: RecordId::new(),
            topic: topic.to_string(),
            title: draft.title,
            article_text: draft.article_text,
            summary: draft.summary,
            diagram_ideas: draft.diagram_ideas,
            key_insights: draft.key_insights,
            related_topics: draft.related_topics,
            source_urls: gathered.source_urls,
            status: ContentStatus::Generated,
            created_at: now,
            updated_at: now,
        };

        progress.phase("Saving");
        self.storage.save_content(&record).await?;
        info!(id = %record.id, sources = record.source_urls.len(), fallback = draft.fallback, "content stored");
        Ok(record)
    }

    /// Replace the editable fields of `id` and mark it EDITED.
    pub async fn edit(&self, id: &RecordId, edit: ContentEdit) -> Result<Option<ContentRecord>> {
        let Some(mut record) = self.storage.get_content(id).await? else {
            return Ok(None);
        };
        record.title = edit.title;
        record.article_text = edit.article_text;
        record.summary = edit.summary;
        record.status = ContentStatus::Edited;
        record.updated_at = Utc::now();
        self.storage.save_content(&record).await?;
        info!(%id, "content edited");
        Ok(Some(record))
    }

    /// Mark `id` APPROVED.
    pub async fn approve(&self, id: &RecordId) -> Result<Option<ContentRecord>> {
        let Some(mut record) = self.storage.get_content(id).await? else {
            return Ok(None);
        };
        record.status = ContentStatus::Approved;
        record.updated_at = Utc::now();
        self.storage.save_content(&record).await?;
        info!(%id, "content approved");
        Ok(Some(record))
    }

    pub async fn get(&self, id: &RecordId) -> Result<Option<ContentRecord>> {
        self.storage.get_content(id).await
    }

    /// All stored articles, newest first.
    pub async fn history(&self) -> Result<Vec<ContentRecord>> {
        self.storage.list_content().await
    }
}
