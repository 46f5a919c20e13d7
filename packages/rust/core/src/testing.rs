//! Fixtures shared by the orchestrator tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use topiclens_extract::PageExtractor;
use topiclens_llm::{StructuredGenerator, TextGenerator};
use topiclens_search::SearchClient;
use topiclens_shared::{ExtractConfig, Result, TopicLensError};
use topiclens_storage::Storage;

use crate::pipeline::Sources;

/// Start a server answering `/search.json` with one result per entry of
/// `page_chars`, each linking to a page with that many characters of text.
pub async fn mock_web(page_chars: &[usize]) -> MockServer {
    let server = MockServer::start().await;

    let results: Vec<_> = page_chars
        .iter()
        .enumerate()
        .map(|(i, _)| {
            json!({
                "title": format!("Result {i}"),
                "link": format!("{}/page/{i}", server.uri()),
                "snippet": "snippet",
                "position": i + 1,
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organic_results": results,
            "search_information": {"total_results": "3", "time_taken_displayed": 0.2},
        })))
        .mount(&server)
        .await;

    for (i, chars) in page_chars.iter().enumerate() {
        let html = format!("<html><body><p>{}</p></body></html>", "a".repeat(*chars));
        Mock::given(method("GET"))
            .and(path(format!("/page/{i}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&server)
            .await;
    }

    server
}

pub fn sources(server: &MockServer) -> Arc<Sources> {
    let search = SearchClient::new(format!("{}/search.json", server.uri()), "test-key")
        .expect("search client");
    let extractor = PageExtractor::new(&ExtractConfig {
        allow_private_hosts: true,
        ..ExtractConfig::default()
    })
    .expect("extractor");
    Arc::new(Sources::new(search, extractor))
}

pub async fn temp_storage() -> Arc<Storage> {
    let tmp = std::env::temp_dir().join(format!("tl_test_{}.db", Uuid::now_v7()));
    Arc::new(Storage::open(&tmp).await.expect("open test db"))
}

/// Provider with a fixed reply (or failure) that counts its calls.
pub struct Scripted {
    reply: Option<String>,
    pub calls: AtomicUsize,
}

impl Scripted {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for Scripted {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .clone()
            .ok_or_else(|| TopicLensError::Generation("provider down".into()))
    }
}

pub fn generator(provider: &Arc<Scripted>) -> StructuredGenerator {
    StructuredGenerator::new(Arc::clone(provider) as Arc<dyn TextGenerator>)
}
