//! Concurrent page fetching and readable-text extraction.
//!
//! [`PageExtractor::extract`] fetches every URL with a bounded fan-out,
//! keeps pages whose heading/paragraph text meets a minimum length, and
//! returns them in input order. A bad URL never fails the batch: it is
//! logged and skipped.

pub mod corpus;
pub mod guard;
pub mod html;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};
use url::Url;

use topiclens_shared::{ExtractConfig, Result, TopicLensError};

pub use corpus::synthesize;

// ---------------------------------------------------------------------------
// ExtractedPage
// ---------------------------------------------------------------------------

/// Readable text of one kept page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub url: String,
    pub text: String,
}

/// Outcome of fetching a single URL.
enum PageOutcome {
    Kept(ExtractedPage),
    TooShort { url: String, chars: usize },
}

// ---------------------------------------------------------------------------
// PageExtractor
// ---------------------------------------------------------------------------

/// Fetches pages and selects their readable text.
pub struct PageExtractor {
    client: Client,
    concurrency: usize,
    /// Allow localhost/private IPs (local testing against mock servers).
    allow_private_hosts: bool,
}

impl PageExtractor {
    /// Create an extractor from the `[extract]` config section.
    pub fn new(config: &ExtractConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TopicLensError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            concurrency: config.concurrency.max(1),
            allow_private_hosts: config.allow_private_hosts,
        })
    }

    /// Fetch `urls` and keep pages with at least `min_chars` characters of text.
    ///
    /// Output order follows input order; failed and short pages are dropped.
    #[instrument(skip_all, fields(urls = urls.len(), min_chars = min_chars))]
    pub async fn extract(&self, urls: &[String], min_chars: usize) -> Vec<ExtractedPage> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(urls.len());

        for raw in urls {
            let client = self.client.clone();
            let sem = semaphore.clone();
            let raw = raw.clone();
            let allow_private = self.allow_private_hosts;

            handles.push(tokio::spawn(async move {
                let _permit = sem
                    .acquire_owned()
                    .await
                    .map_err(|e| TopicLensError::Network(format!("fetch pool closed: {e}")))?;
                fetch_page(&client, &raw, min_chars, allow_private).await
            }));
        }

        let mut kept = Vec::new();
        for (raw, handle) in urls.iter().zip(handles) {
            match handle.await {
                Ok(Ok(PageOutcome::Kept(page))) => kept.push(page),
                Ok(Ok(PageOutcome::TooShort { url, chars })) => {
                    debug!(%url, chars, min_chars, "page below minimum length, skipping");
                }
                Ok(Err(e)) => warn!(url = %raw, error = %e, "page extraction failed, skipping"),
                Err(e) => warn!(url = %raw, error = %e, "extraction task failed, skipping"),
            }
        }

        info!(requested = urls.len(), kept = kept.len(), "extraction completed");
        kept
    }
}

/// Fetch one page and select its readable text.
async fn fetch_page(
    client: &Client,
    raw: &str,
    min_chars: usize,
    allow_private: bool,
) -> Result<PageOutcome> {
    let url = Url::parse(raw).map_err(|e| TopicLensError::parse(format!("{raw}: {e}")))?;

    if !allow_private && guard::is_ssrf_target(&url) {
        return Err(TopicLensError::validation(format!(
            "{url}: refusing to fetch non-public target"
        )));
    }

    debug!(%url, "fetching page");

    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| TopicLensError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(TopicLensError::Network(format!("{url}: HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| TopicLensError::Network(format!("{url}: body read failed: {e}")))?;

    let text = html::readable_text(&body);
    let chars = text.chars().count();
    if chars < min_chars {
        return Ok(PageOutcome::TooShort {
            url: raw.to_string(),
            chars,
        });
    }

    Ok(PageOutcome::Kept(ExtractedPage {
        url: raw.to_string(),
        text,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_extractor() -> PageExtractor {
        let config = ExtractConfig {
            allow_private_hosts: true,
            concurrency: 2,
            ..ExtractConfig::default()
        };
        PageExtractor::new(&config).expect("extractor")
    }

    fn article(words: usize) -> String {
        let body = "lorem ".repeat(words);
        format!("<html><body><h1>Title</h1><p>{body}</p></body></html>")
    }

    async fn serve(server: &MockServer, route: &str, status: u16, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn keeps_long_pages_in_input_order() {
        let server = MockServer::start().await;
        serve(&server, "/a", 200, article(40)).await;
        serve(&server, "/b", 200, article(40)).await;
        serve(&server, "/c", 200, article(40)).await;

        let urls: Vec<String> = ["/c", "/a", "/b"]
            .iter()
            .map(|p| format!("{}{p}", server.uri()))
            .collect();

        let pages = test_extractor().extract(&urls, 100).await;
        let kept: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(kept, urls.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(pages[0].text.starts_with("Title lorem"));
    }

    #[tokio::test]
    async fn drops_failed_and_short_pages() {
        let server = MockServer::start().await;
        serve(&server, "/good", 200, article(40)).await;
        serve(&server, "/short", 200, article(3)).await;
        serve(&server, "/missing", 404, "not found".into()).await;
        serve(&server, "/also-good", 200, article(60)).await;

        let urls = vec![
            format!("{}/good", server.uri()),
            format!("{}/short", server.uri()),
            "not a url".to_string(),
            format!("{}/missing", server.uri()),
            format!("{}/also-good", server.uri()),
        ];

        let pages = test_extractor().extract(&urls, 100).await;
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].url, urls[0]);
        assert_eq!(pages[1].url, urls[4]);
    }

    #[tokio::test]
    async fn threshold_is_inclusive() {
        let server = MockServer::start().await;
        // "Title" + " " + 94 x "a" = 100 chars
        let body = format!("<h1>Title</h1><p>{}</p>", "a".repeat(94));
        serve(&server, "/exact", 200, body).await;

        let urls = vec![format!("{}/exact", server.uri())];
        assert_eq!(test_extractor().extract(&urls, 100).await.len(), 1);
        assert!(test_extractor().extract(&urls, 101).await.is_empty());
    }

    #[tokio::test]
    async fn private_hosts_blocked_by_default() {
        let server = MockServer::start().await;
        serve(&server, "/page", 200, article(40)).await;

        let extractor = PageExtractor::new(&ExtractConfig::default()).expect("extractor");
        let pages = extractor
            .extract(&[format!("{}/page", server.uri())], 100)
            .await;
        assert!(pages.is_empty());
    }
}
