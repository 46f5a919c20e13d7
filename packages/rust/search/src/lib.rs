//! Web-search client for a SerpApi-compatible JSON endpoint.
//!
//! Converts a free-text query into ordered [`SearchResult`]s plus the
//! provider's [`SearchMetadata`]. Unlike page extraction, any failure here
//! is surfaced as [`TopicLensError::Search`] and aborts the pipeline.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument};

use topiclens_shared::{
    Result, SearchConfig, SearchMetadata, SearchResponse, SearchResult, TopicLensError,
    validate_api_key,
};

/// HTTP client for the search provider.
pub struct SearchClient {
    client: Client,
    endpoint: String,
    api_key: String,
    num_results: u32,
    language: String,
}

impl SearchClient {
    /// Build a client against `endpoint` with an explicit key.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_settings(endpoint, api_key, 10, "en", Duration::from_secs(30))
    }

    /// Build a client from the `[search]` config section, reading the key from
    /// the configured env var.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let api_key = validate_api_key(&config.api_key_env, "Search")?;
        Self::with_settings(
            config.endpoint.clone(),
            api_key,
            config.num_results,
            &config.language,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn with_settings(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        num_results: u32,
        language: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TopicLensError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            num_results,
            language: language.to_string(),
        })
    }

    /// Run `query` against the provider.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn search(&self, query: &str) -> Result<SearchResponse> {
        let num = self.num_results.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("api_key", self.api_key.as_str()),
                ("num", num.as_str()),
                ("hl", self.language.as_str()),
            ])
            .send()
            .await
            .map_err(|e| TopicLensError::Search(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TopicLensError::Search(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TopicLensError::Search(format!("body read failed: {e}")))?;

        let parsed = parse_response(&body)?;
        info!(results = parsed.results.len(), "search completed");
        Ok(parsed)
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parse a provider envelope. A missing `organic_results` array is an empty
/// result, not an error; invalid JSON is.
pub fn parse_response(body: &str) -> Result<SearchResponse> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| TopicLensError::Search(format!("invalid JSON response: {e}")))?;

    let results = json
        .get("organic_results")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| parse_result(item, i))
                .collect()
        })
        .unwrap_or_default();

    let metadata = json
        .get("search_metadata")
        .map(parse_metadata)
        .unwrap_or_default();

    debug!(?metadata, "parsed search metadata");
    Ok(SearchResponse { results, metadata })
}

fn parse_result(item: &Value, index: usize) -> SearchResult {
    let fallback_position = u32::try_from(index + 1).unwrap_or(u32::MAX);
    SearchResult {
        title: string_field(item, "title"),
        link: string_field(item, "link"),
        snippet: string_field(item, "snippet"),
        position: item
            .get("position")
            .and_then(Value::as_u64)
            .and_then(|p| u32::try_from(p).ok())
            .unwrap_or(fallback_position),
    }
}

fn parse_metadata(meta: &Value) -> SearchMetadata {
    let total_results = match meta.get("total_results") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "0".to_string(),
    };
    SearchMetadata {
        query_displayed: string_field(meta, "query_displayed"),
        total_results,
        time_taken: meta
            .get("time_taken_displayed")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
    }
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn positions_default_to_index() {
        let body = r#"{
            "organic_results": [
                {"title": "A", "link": "https://a.example", "snippet": "sa", "position": 4},
                {"title": "B", "link": "https://b.example"},
                {"link": "https://c.example"}
            ]
        }"#;
        let parsed = parse_response(body).expect("parse");
        assert_eq!(parsed.results.len(), 3);
        assert_eq!(parsed.results[0].position, 4);
        assert_eq!(parsed.results[1].position, 2);
        assert_eq!(parsed.results[1].snippet, "");
        assert_eq!(parsed.results[2].title, "");
        assert_eq!(parsed.results[2].position, 3);
    }

    #[test]
    fn missing_results_is_empty() {
        let parsed = parse_response(r#"{"search_metadata": {}}"#).expect("parse");
        assert!(parsed.results.is_empty());
        assert_eq!(parsed.metadata.total_results, "0");
    }

    #[test]
    fn metadata_is_read() {
        let body = r#"{
            "organic_results": [],
            "search_metadata": {
                "query_displayed": "rust async",
                "total_results": "1,230",
                "time_taken_displayed": 0.42
            }
        }"#;
        let parsed = parse_response(body).expect("parse");
        assert_eq!(parsed.metadata.query_displayed, "rust async");
        assert_eq!(parsed.metadata.total_results, "1,230");
        assert!((parsed.metadata.time_taken - 0.42).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_json_is_search_failure() {
        let err = parse_response("<html>oops</html>").unwrap_err();
        assert!(matches!(err, TopicLensError::Search(_)));
    }

    #[tokio::test]
    async fn search_sends_query_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("q", "quantum computing"))
            .and(query_param("api_key", "secret"))
            .and(query_param("num", "10"))
            .and(query_param("hl", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"organic_results": [{"title": "Q", "link": "https://q.example", "position": 1}]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            SearchClient::new(format!("{}/search.json", server.uri()), "secret").expect("client");
        let response = client.search("quantum computing").await.expect("search");
        assert_eq!(response.links(), vec!["https://q.example".to_string()]);
    }

    #[tokio::test]
    async fn non_success_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let client = SearchClient::new(server.uri(), "bad").expect("client");
        let err = client.search("anything").await.unwrap_err();
        assert!(err.to_string().starts_with("search failed: HTTP 401"));
    }
}
