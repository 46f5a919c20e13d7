//! Wiring from [`AppConfig`] to the orchestrators shared by the CLI and server.

use std::path::Path;
use std::sync::Arc;

use topiclens_core::{ContentOrchestrator, ResearchOrchestrator, Sources};
use topiclens_diagram::DiagramDispatcher;
use topiclens_extract::PageExtractor;
use topiclens_llm::{ChatClient, StructuredGenerator};
use topiclens_search::SearchClient;
use topiclens_shared::{AppConfig, ResearchMode, Result};
use topiclens_storage::Storage;

/// Fully wired application services.
pub(crate) struct App {
    pub research: ResearchOrchestrator,
    pub content: ContentOrchestrator,
    pub diagrams: DiagramDispatcher,
}

impl App {
    /// Open storage and build every client from `config`.
    ///
    /// `mode` overrides the configured research policy.
    pub async fn from_config(config: &AppConfig, mode: Option<ResearchMode>) -> Result<Self> {
        let storage = Arc::new(Storage::open(Path::new(&config.defaults.db_path)).await?);
        let sources = Arc::new(Sources::new(
            SearchClient::from_config(&config.search)?,
            PageExtractor::new(&config.extract)?,
        ));
        let generator = StructuredGenerator::new(Arc::new(ChatClient::from_config(&config.openrouter)?));

        Ok(Self {
            research: ResearchOrchestrator::new(
                Arc::clone(&storage),
                Arc::clone(&sources),
                generator.clone(),
                mode.unwrap_or(config.defaults.research_mode),
                config.extract.research_min_chars,
            ),
            content: ContentOrchestrator::new(
                storage,
                sources,
                generator,
                config.extract.content_min_chars,
            ),
            diagrams: DiagramDispatcher::from_config(&config.diagram)?,
        })
    }
}
