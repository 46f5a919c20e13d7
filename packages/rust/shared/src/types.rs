//! Core domain types for TopicLens: search results, generated records,
//! and diagram requests/responses.
//!
//! Records serialize with camelCase field names so the HTTP API speaks
//! the same JSON as the browser frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Normalized lookup key for a topic: trimmed and lowercased.
///
/// Two topics with the same key are the same request.
pub fn topic_key(topic: &str) -> String {
    topic.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// RecordId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for persisted record identifiers (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub Uuid);

impl RecordId {
    /// Generate a new time-sortable record identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// One organic result returned by the search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
    /// Provider rank, 1-based.
    pub position: u32,
}

/// Metadata block reported alongside search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetadata {
    pub query_displayed: String,
    /// Provider-formatted count, kept as text (e.g. "1,230,000").
    pub total_results: String,
    /// Seconds the provider spent on the query.
    pub time_taken: f64,
}

/// Full search response: ordered results plus metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub metadata: SearchMetadata,
}

impl SearchResponse {
    /// Result links in provider order.
    pub fn links(&self) -> Vec<String> {
        self.results.iter().map(|r| r.link.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Research
// ---------------------------------------------------------------------------

/// What the research pipeline does when every page is dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchMode {
    /// Continue with an empty corpus and rely on the generation fallback.
    #[default]
    Permissive,
    /// Fail with "no information found".
    Strict,
}

impl std::fmt::Display for ResearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permissive => f.write_str("permissive"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

impl std::str::FromStr for ResearchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "strict" => Ok(Self::Strict),
            other => Err(format!(
                "unknown research mode '{other}': expected 'permissive' or 'strict'"
            )),
        }
    }
}

/// Persisted output of the research pipeline. Immutable once saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRecord {
    pub id: RecordId,
    pub topic: String,
    pub title: String,
    pub summary: String,
    pub comprehensive_response: String,
    pub key_points: Vec<String>,
    pub diagram_ideas: Vec<String>,
    pub related_topics: Vec<String>,
    /// URLs whose pages were kept, in extraction order.
    pub source_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Review state of a generated article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentStatus {
    Generated,
    Edited,
    Approved,
}

impl ContentStatus {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generated => "GENERATED",
            Self::Edited => "EDITED",
            Self::Approved => "APPROVED",
        }
    }
}

impl std::str::FromStr for ContentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "GENERATED" => Ok(Self::Generated),
            "EDITED" => Ok(Self::Edited),
            "APPROVED" => Ok(Self::Approved),
            other => Err(format!("unknown content status '{other}'")),
        }
    }
}

/// Persisted output of the content pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: RecordId,
    pub topic: String,
    pub title: String,
    pub article_text: String,
    pub summary: String,
    pub diagram_ideas: Vec<String>,
    pub key_insights: Vec<String>,
    pub related_topics: Vec<String>,
    /// URLs whose pages were kept, in extraction order.
    pub source_urls: Vec<String>,
    pub status: ContentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Manual edit applied to a content record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEdit {
    pub title: String,
    pub article_text: String,
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Diagrams
// ---------------------------------------------------------------------------

/// Diagram kinds. `Basic` marks the placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagramType {
    Architecture,
    Flowchart,
    Workflow,
    Timeline,
    Conceptual,
    Artistic,
    Professional,
    Mermaid,
    Basic,
}

impl std::fmt::Display for DiagramType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Architecture => "ARCHITECTURE",
            Self::Flowchart => "FLOWCHART",
            Self::Workflow => "WORKFLOW",
            Self::Timeline => "TIMELINE",
            Self::Conceptual => "CONCEPTUAL",
            Self::Artistic => "ARTISTIC",
            Self::Professional => "PROFESSIONAL",
            Self::Mermaid => "MERMAID",
            Self::Basic => "BASIC",
        };
        f.write_str(name)
    }
}

/// A diagram request. Only `description` drives dispatch; the other
/// hints are carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramRequest {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default = "default_diagram_width")]
    pub width: u32,
    #[serde(default = "default_diagram_height")]
    pub height: u32,
    #[serde(default = "default_color_scheme")]
    pub color_scheme: String,
}

impl DiagramRequest {
    /// Request with every hint at its default.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            topic: None,
            preferred_type: None,
            style: None,
            format: None,
            width: default_diagram_width(),
            height: default_diagram_height(),
            color_scheme: default_color_scheme(),
        }
    }
}

fn default_diagram_width() -> u32 {
    800
}
fn default_diagram_height() -> u32 {
    600
}
fn default_color_scheme() -> String {
    "blue".into()
}

/// Output of the diagram dispatcher. `provider` names the backend that
/// actually produced it, which may sit below the classified type when a
/// fallback fired.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramResponse {
    #[serde(rename = "type")]
    pub diagram_type: DiagramType,
    pub format: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mermaid_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d3_config: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub description: String,
    pub generated_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
}

impl DiagramResponse {
    /// Empty response for `request`; callers fill in the payload fields.
    pub fn for_request(
        request: &DiagramRequest,
        diagram_type: DiagramType,
        format: &str,
        provider: &str,
    ) -> Self {
        Self {
            diagram_type,
            format: format.to_string(),
            provider: provider.to_string(),
            svg_content: None,
            image_url: None,
            mermaid_code: None,
            d3_config: None,
            document_id: None,
            description: request.description.clone(),
            generated_at: Utc::now(),
            width: request.width,
            height: request.height,
        }
    }
}
