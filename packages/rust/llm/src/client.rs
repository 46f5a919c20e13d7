//! OpenAI-compatible chat completion client (OpenRouter by default).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use topiclens_shared::{OpenRouterConfig, Result, TopicLensError, api_key_from_env};

use crate::TextGenerator;

/// Chat client for `POST {base_url}/chat/completions`.
pub struct ChatClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl ChatClient {
    /// Build a client against `base_url` using `model`.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TopicLensError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key,
        })
    }

    /// Build a client from the `[openrouter]` section. A missing key is allowed
    /// for local OpenAI-compatible servers.
    pub fn from_config(config: &OpenRouterConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            config.default_model.clone(),
            api_key_from_env(&config.api_key_env),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Resolve the chat completions endpoint from the base URL.
    fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/chat/completions") {
            base.to_string()
        } else if base.ends_with("/v1") {
            format!("{base}/chat/completions")
        } else {
            format!("{base}/v1/chat/completions")
        }
    }
}

#[async_trait]
impl TextGenerator for ChatClient {
    #[instrument(skip_all, fields(model = %self.model, prompt_chars = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0.3,
        });

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TopicLensError::Generation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TopicLensError::Generation(format!("HTTP {status}")));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| TopicLensError::Generation(format!("invalid response body: {e}")))?;

        let content = json["choices"]
            .get(0)
            .and_then(|c| c["message"]["content"].as_str())
            .unwrap_or_default()
            .to_string();

        if content.trim().is_empty() {
            return Err(TopicLensError::Generation("empty completion".into()));
        }

        debug!(chars = content.len(), "completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base: &str, key: Option<&str>) -> ChatClient {
        ChatClient::new(
            base,
            "test-model",
            key.map(String::from),
            Duration::from_secs(5),
        )
        .expect("client")
    }

    #[test]
    fn endpoint_resolution() {
        let timeout = Duration::from_secs(1);
        let c = ChatClient::new("https://openrouter.ai/api/v1", "m", None, timeout).unwrap();
        assert_eq!(c.endpoint(), "https://openrouter.ai/api/v1/chat/completions");
        let c = ChatClient::new("http://localhost:1234/", "m", None, timeout).unwrap();
        assert_eq!(c.endpoint(), "http://localhost:1234/v1/chat/completions");
        let c = ChatClient::new("http://h/v1/chat/completions", "m", None, timeout).unwrap();
        assert_eq!(c.endpoint(), "http://h/v1/chat/completions");
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "{\"title\": \"x\"}"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(&server.uri(), Some("sk-test"))
            .complete("hello")
            .await
            .expect("completion");
        assert_eq!(reply, "{\"title\": \"x\"}");
    }

    #[tokio::test]
    async fn error_status_and_empty_content_fail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": null}}]
            })))
            .mount(&server)
            .await;

        let c = client(&server.uri(), None);
        let first = c.complete("x").await.unwrap_err();
        assert!(first.to_string().contains("HTTP 429"));
        let second = c.complete("x").await.unwrap_err();
        assert!(second.to_string().contains("empty completion"));
    }
}
