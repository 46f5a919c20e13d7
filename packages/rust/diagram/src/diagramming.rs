//! Third-party diagramming service (Lucidchart-style document API).

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tracing::debug;

use topiclens_shared::{Result, TopicLensError};

/// A document created by the diagramming service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramDocument {
    pub id: String,
    pub export_url: String,
}

pub struct DiagrammingClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl DiagrammingClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Create a flowchart document for `description`.
    pub async fn create(&self, description: &str) -> Result<DiagramDocument> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TopicLensError::Diagram("no diagramming API key configured".into()))?;

        let body = json!({
            "title": "AI Generated Diagram",
            "description": description,
            "template": "flowchart",
            "autoLayout": true,
        });

        let response = self
            .client
            .post(format!("{}/documents", self.base()))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TopicLensError::Diagram(format!("diagramming request failed: {e}")))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(TopicLensError::Diagram(format!("diagramming HTTP {status}")));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| TopicLensError::Diagram(format!("diagramming response body: {e}")))?;

        let id = match &json["id"] {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return Err(TopicLensError::Diagram("diagramming response carried no id".into())),
        };

        debug!(document_id = %id, "diagram document created");
        Ok(DiagramDocument {
            export_url: format!("{}/documents/{id}/export/svg", self.base()),
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn created_document_yields_export_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/documents"))
            .and(body_json(json!({
                "title": "AI Generated Diagram",
                "description": "quarterly review",
                "template": "flowchart",
                "autoLayout": true,
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "doc-7"})))
            .mount(&server)
            .await;

        let client = DiagrammingClient::new(Client::new(), server.uri(), Some("k".into()));
        let doc = client.create("quarterly review").await.expect("document");
        assert_eq!(doc.id, "doc-7");
        assert_eq!(doc.export_url, format!("{}/documents/doc-7/export/svg", server.uri()));
    }

    #[tokio::test]
    async fn non_created_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "doc-7"})))
            .mount(&server)
            .await;

        let client = DiagrammingClient::new(Client::new(), server.uri(), Some("k".into()));
        assert!(client.create("x").await.is_err());
    }
}
