//! Generative-text layer for TopicLens.
//!
//! - [`TextGenerator`]: the provider seam (prompt in, text out)
//! - [`ChatClient`]: OpenAI-compatible implementation
//! - [`StructuredGenerator`]: prompts, JSON coercion, and deterministic fallbacks

pub mod client;
pub mod coerce;
pub mod fallback;
pub mod generator;
pub mod prompts;

use async_trait::async_trait;
use topiclens_shared::Result;

pub use client::ChatClient;
pub use generator::{ContentDraft, ResearchDraft, StructuredGenerator};

/// A generative-text provider.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send `prompt` and return the raw reply text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
