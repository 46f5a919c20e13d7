//! AI image generation for conceptual and artistic diagrams.

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tracing::debug;

use topiclens_shared::{Result, TopicLensError};

/// Wrap a diagram description in the illustration style brief.
pub fn image_prompt(description: &str) -> String {
    format!(
        "Create a professional, clean diagram illustration for: {description}

Style requirements:
- Clean, modern design
- Technical/business appropriate
- Clear visual hierarchy
- Minimal color palette (blues, grays, whites)
- No text overlays (diagram should be self-explanatory)
- High contrast for readability
- Professional presentation quality

The diagram should visually represent the concept in a way that would be suitable
for a business presentation or technical documentation.
"
    )
}

/// Client for an OpenAI-style image generation endpoint.
pub struct ImageGenerator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ImageGenerator {
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        }
    }

    /// Generate an image for `description`, returning its URL.
    pub async fn generate(&self, description: &str) -> Result<String> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TopicLensError::Diagram("no image API key configured".into()))?;

        let body = json!({
            "prompt": image_prompt(description),
            "model": "dall-e-3",
            "n": 1,
            "size": "1024x1024",
            "quality": "standard",
            "style": "vivid",
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TopicLensError::Diagram(format!("image request failed: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(TopicLensError::Diagram(format!("image generation HTTP {status}")));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| TopicLensError::Diagram(format!("image response body: {e}")))?;

        let url = json["data"]
            .get(0)
            .and_then(|d| d["url"].as_str())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| TopicLensError::Diagram("image response carried no url".into()))?;

        debug!(url, "image generated");
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let generator = ImageGenerator::new(Client::new(), server.uri(), None);
        assert!(generator.generate("abstract art").await.is_err());
    }

    #[tokio::test]
    async fn returns_first_image_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer img-key"))
            .and(body_partial_json(json!({"model": "dall-e-3", "size": "1024x1024"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"url": "https://img.example/1.png"}]
            })))
            .mount(&server)
            .await;

        let generator = ImageGenerator::new(Client::new(), server.uri(), Some("img-key".into()));
        let url = generator.generate("abstract art").await.expect("image");
        assert_eq!(url, "https://img.example/1.png");
    }

    #[test]
    fn prompt_embeds_description() {
        assert!(image_prompt("neural nets").starts_with(
            "Create a professional, clean diagram illustration for: neural nets"
        ));
    }
}
