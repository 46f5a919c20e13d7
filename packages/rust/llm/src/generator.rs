//! Structured generation: corpus + topic in, typed draft out.
//!
//! Generation never fails. A provider error falls back to a draft built from
//! the corpus; an unparseable reply falls back to one built from the reply.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::TextGenerator;
use crate::coerce::FieldReader;
use crate::fallback;
use crate::prompts;

/// Body length kept by the research fallback.
const RESEARCH_BODY_CHARS: usize = 500;

/// Body length kept by the content fallback.
const CONTENT_BODY_CHARS: usize = 1000;

/// Generated research fields, before ids and sources are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchDraft {
    pub title: String,
    pub summary: String,
    pub comprehensive_response: String,
    pub key_points: Vec<String>,
    pub diagram_ideas: Vec<String>,
    pub related_topics: Vec<String>,
    /// Whether the deterministic fallback produced this draft.
    pub fallback: bool,
}

/// Generated article fields, before ids and sources are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentDraft {
    pub title: String,
    pub article_text: String,
    pub summary: String,
    pub diagram_ideas: Vec<String>,
    pub key_insights: Vec<String>,
    pub related_topics: Vec<String>,
    /// Whether the deterministic fallback produced this draft.
    pub fallback: bool,
}

/// Prompts a [`TextGenerator`] and coerces its reply into drafts.
#[derive(Clone)]
pub struct StructuredGenerator {
    provider: Arc<dyn TextGenerator>,
}

impl StructuredGenerator {
    pub fn new(provider: Arc<dyn TextGenerator>) -> Self {
        Self { provider }
    }

    /// Produce a research draft for `topic` from `corpus`.
    #[instrument(skip_all, fields(topic = %topic, corpus_chars = corpus.len()))]
    pub async fn generate_research(&self, topic: &str, corpus: &str) -> ResearchDraft {
        let prompt = prompts::research_prompt(topic, corpus);
        let reply = match self.provider.complete(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "research generation failed, using fallback");
                return research_fallback(topic, corpus);
            }
        };

        match FieldReader::parse(&reply) {
            Ok(fields) => {
                info!("research draft parsed");
                ResearchDraft {
                    title: fields.text_or("title", title_default(topic)),
                    summary: fields.text_or("summary", &fallback::research_summary(topic)),
                    comprehensive_response: fields.text_or("comprehensiveResponse", ""),
                    key_points: fields.array_or_empty("keyPoints"),
                    diagram_ideas: fields.array_or_empty("diagramIdeas"),
                    related_topics: fields.array_or_empty("relatedTopics"),
                    fallback: false,
                }
            }
            Err(e) => {
                warn!(error = %e, "research reply unparseable, using fallback");
                research_fallback(topic, &reply)
            }
        }
    }

    /// Produce an article draft for `topic` from `corpus`.
    #[instrument(skip_all, fields(topic = %topic, corpus_chars = corpus.len()))]
    pub async fn generate_content(&self, topic: &str, corpus: &str) -> ContentDraft {
        let prompt = prompts::content_prompt(topic, corpus);
        let reply = match self.provider.complete(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "content generation failed, using fallback");
                return content_fallback(topic, corpus);
            }
        };

        match FieldReader::parse(&reply) {
            Ok(fields) => {
                info!("content draft parsed");
                ContentDraft {
                    title: fields.text_or("title", title_default(topic)),
                    article_text: fields.text_or("articleText", ""),
                    summary: fields.text_or("summary", &fallback::content_summary(topic)),
                    diagram_ideas: fields.array_or_empty("diagramIdeas"),
                    key_insights: fields.array_or_empty("keyInsights"),
                    related_topics: fields.array_or_empty("relatedTopics"),
                    fallback: false,
                }
            }
            Err(e) => {
                warn!(error = %e, "content reply unparseable, using fallback");
                content_fallback(topic, &reply)
            }
        }
    }
}

fn title_default(topic: &str) -> &str {
    if topic.trim().is_empty() {
        "Research results"
    } else {
        topic
    }
}

/// Deterministic research draft built from `topic` and `body`.
pub fn research_fallback(topic: &str, body: &str) -> ResearchDraft {
    ResearchDraft {
        title: title_default(topic).to_string(),
        summary: fallback::research_summary(topic),
        comprehensive_response: fallback::truncate_with_ellipsis(body, RESEARCH_BODY_CHARS),
        key_points: fallback::research_key_points(),
        diagram_ideas: fallback::diagram_ideas(topic),
        related_topics: fallback::related_topics(topic),
        fallback: true,
    }
}

/// Deterministic article draft built from `topic` and `body`.
pub fn content_fallback(topic: &str, body: &str) -> ContentDraft {
    ContentDraft {
        title: format!("Understanding {topic}"),
        article_text: fallback::truncate_with_ellipsis(body, CONTENT_BODY_CHARS),
        summary: fallback::content_summary(topic),
        diagram_ideas: fallback::diagram_ideas(topic),
        key_insights: fallback::key_insights(topic),
        related_topics: fallback::related_topics(topic),
        fallback: true,
    }
}
