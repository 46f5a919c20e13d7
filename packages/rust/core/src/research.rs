//! Research pipeline: topic → cached or freshly generated [`ResearchRecord`].

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use topiclens_llm::StructuredGenerator;
use topiclens_shared::{RecordId, ResearchMode, ResearchRecord, Result, TopicLensError};
use topiclens_storage::Storage;

use crate::pipeline::{ProgressReporter, Sources, TopicLocks, validate_topic};

/// Runs and recalls research for topics.
pub struct ResearchOrchestrator {
    storage: Arc<Storage>,
    sources: Arc<Sources>,
    generator: StructuredGenerator,
    mode: ResearchMode,
    min_chars: usize,
    locks: TopicLocks,
}

impl ResearchOrchestrator {
    pub fn new(
        storage: Arc<Storage>,
        sources: Arc<Sources>,
        generator: StructuredGenerator,
        mode: ResearchMode,
        min_chars: usize,
    ) -> Self {
        Self {
            storage,
            sources,
            generator,
            mode,
            min_chars,
            locks: TopicLocks::new(),
        }
    }

    /// Return the stored research for `topic`, running the pipeline on a miss.
    pub async fn run(&self, topic: &str, progress: &dyn ProgressReporter) -> Result<ResearchRecord> {
        let topic = validate_topic(topic)?;
        self.run_locked(topic, progress)
            .await
            .map_err(|e| TopicLensError::pipeline("research", topic, e))
    }

    #[instrument(skip_all, fields(topic = %topic, mode = %self.mode))]
    async fn run_locked(&self, topic: &str, progress: &dyn ProgressReporter) -> Result<ResearchRecord> {
        let _guard = self.locks.acquire(topic).await;

        if let Some(cached) = self.storage.find_research_by_topic(topic).await? {
            info!(id = %cached.id, "research cache hit");
            progress.cache_hit(topic);
            return Ok(cached);
        }

        let gathered = self.sources.gather(topic, self.min_chars, progress).await?;
        if gathered.is_empty() {
            if self.mode == ResearchMode::Strict {
                return Err(TopicLensError::NoInformation {
                    topic: topic.to_string(),
                });
            }
            warn!("no pages kept, generating from an empty corpus");
        }

        progress.phase("Generating research");
        let draft = self.generator.generate_research(topic, &gathered.corpus).await;

        let record = ResearchRecord {
            id: RecordId::new(),
            topic: topic.to_string(),
            title: draft.title,
            summary: draft.summary,
            comprehensive_response: draft.comprehensive_response,
            key_points: draft.key_points,
            diagram_ideas: draft.diagram_ideas,
            related_topics: draft.related_topics,
            source_urls: gathered.source_urls,
            created_at: Utc::now(),
        };

        progress.phase("Saving");
        self.storage.save_research(&record).await?;
        info!(id = %record.id, sources = record.source_urls.len(), fallback = draft.fallback, "research stored");
        Ok(record)
    }

    pub async fn get(&self, id: &RecordId) -> Result<Option<ResearchRecord>> {
        self.storage.get_research(id).await
    }

    /// All stored research, newest first.
    pub async fn history(&self) -> Result<Vec<ResearchRecord>> {
        self.storage.list_research().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SilentProgress;
    use crate::testing::{Scripted, generator, mock_web, sources, temp_storage};

    const REPLY: &str = r#"{
        "title": "Rust Ownership",
        "summary": "Memory safety without GC.",
        "comprehensiveResponse": "Long form.",
        "keyPoints": ["Borrowing", "Lifetimes"],
        "diagramIdeas": ["Ownership flow"],
        "relatedTopics": ["C++ RAII"]
    }"#;

    async fn orchestrator(
        page_chars: &[usize],
        provider: &Arc<Scripted>,
        mode: ResearchMode,
    ) -> (ResearchOrchestrator, wiremock::MockServer) {
        let server = mock_web(page_chars).await;
        let orchestrator = ResearchOrchestrator::new(
            temp_storage().await,
            sources(&server),
            generator(provider),
            mode,
            200,
        );
        (orchestrator, server)
    }

    #[tokio::test]
    async fn fresh_run_persists_and_keeps_sources_in_order() {
        let provider = Scripted::replying(REPLY);
        let (orchestrator, server) =
            orchestrator(&[400, 50, 250], &provider, ResearchMode::Permissive).await;

        let record = orchestrator.run("Rust ownership", &SilentProgress).await.expect("run");
        assert_eq!(record.title, "Rust Ownership");
        assert_eq!(record.key_points, vec!["Borrowing", "Lifetimes"]);
        assert_eq!(
            record.source_urls,
            vec![format!("{}/page/0", server.uri()), format!("{}/page/2", server.uri())]
        );

        let stored = orchestrator.get(&record.id).await.expect("get").expect("stored");
        assert_eq!(stored.title, record.title);
    }

    #[tokio::test]
    async fn repeated_topic_is_served_from_cache() {
        let provider = Scripted::replying(REPLY);
        let (orchestrator, _server) =
            orchestrator(&[400], &provider, ResearchMode::Permissive).await;

        let first = orchestrator.run("Rust ownership", &SilentProgress).await.expect("first");
        let second = orchestrator.run("  RUST OWNERSHIP ", &SilentProgress).await.expect("second");
        assert_eq!(first.id, second.id);
        assert_eq!(provider.calls(), 1);
        assert_eq!(orchestrator.history().await.expect("history").len(), 1);
    }

    #[tokio::test]
    async fn concurrent_requests_compute_once() {
        let provider = Scripted::replying(REPLY);
        let (orchestrator, _server) =
            orchestrator(&[400], &provider, ResearchMode::Permissive).await;
        let orchestrator = Arc::new(orchestrator);

        let handles: Vec<_> = ["tokio", "Tokio", "TOKIO"]
            .into_iter()
            .map(|topic| {
                let orchestrator = Arc::clone(&orchestrator);
                tokio::spawn(async move { orchestrator.run(topic, &SilentProgress).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.expect("join").expect("run").id);
        }
        assert!(ids.iter().all(|id| *id == ids[0]));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn strict_mode_rejects_empty_corpus() {
        let provider = Scripted::replying(REPLY);
        let (orchestrator, _server) = orchestrator(&[20, 30], &provider, ResearchMode::Strict).await;

        let err = orchestrator.run("obscure", &SilentProgress).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "research failed for topic 'obscure': no information found for 'obscure'"
        );
        assert_eq!(provider.calls(), 0);
        assert!(orchestrator.history().await.expect("history").is_empty());
    }

    #[tokio::test]
    async fn permissive_mode_generates_without_sources() {
        let provider = Scripted::failing();
        let (orchestrator, _server) =
            orchestrator(&[20], &provider, ResearchMode::Permissive).await;

        let record = orchestrator.run("obscure", &SilentProgress).await.expect("run");
        assert!(record.source_urls.is_empty());
        assert_eq!(record.title, "obscure");
        assert_eq!(record.summary, "Research results for: obscure");
        assert!(!record.diagram_ideas.is_empty());
    }

    #[tokio::test]
    async fn search_failure_surfaces() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let provider = Scripted::replying(REPLY);
        let orchestrator = ResearchOrchestrator::new(
            temp_storage().await,
            sources(&server),
            generator(&provider),
            ResearchMode::Permissive,
            200,
        );

        let err = orchestrator.run("rust", &SilentProgress).await.unwrap_err();
        assert!(err.to_string().starts_with("research failed for topic 'rust': search failed"));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn blank_topic_is_rejected() {
        let provider = Scripted::replying(REPLY);
        let (orchestrator, _server) = orchestrator(&[], &provider, ResearchMode::Permissive).await;
        let err = orchestrator.run("   ", &SilentProgress).await.unwrap_err();
        assert!(matches!(err, TopicLensError::Validation { .. }));
    }
}
