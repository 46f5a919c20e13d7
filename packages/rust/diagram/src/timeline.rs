//! Timeline visualizations rendered by an external D3 service.

use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

use topiclens_shared::{Result, TopicLensError};

/// Fixed D3 timeline configuration sent to the render service.
pub fn timeline_config() -> Value {
    json!({
        "type": "timeline",
        "data": [
            {"date": "2020", "event": "AI Research Begins", "category": "research"},
            {"date": "2021", "event": "Model Development", "category": "development"},
            {"date": "2022", "event": "Testing Phase", "category": "testing"},
            {"date": "2023", "event": "Production Release", "category": "release"}
        ],
        "config": {
            "width": 800,
            "height": 300,
            "margin": {"top": 20, "right": 20, "bottom": 30, "left": 40}
        }
    })
}

/// POSTs a D3 config to a render service and returns the SVG it answers with.
pub struct TimelineRenderer {
    client: Client,
    render_url: Option<String>,
}

impl TimelineRenderer {
    pub fn new(client: Client, render_url: Option<String>) -> Self {
        Self { client, render_url }
    }

    pub async fn render(&self, config: &Value) -> Result<String> {
        let url = self
            .render_url
            .as_deref()
            .ok_or_else(|| TopicLensError::Diagram("no timeline render service configured".into()))?;
        debug!(url, "rendering timeline");

        let response = self
            .client
            .post(url)
            .json(config)
            .send()
            .await
            .map_err(|e| TopicLensError::Diagram(format!("timeline render request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TopicLensError::Diagram(format!("timeline render HTTP {status}")));
        }

        let svg = response
            .text()
            .await
            .map_err(|e| TopicLensError::Diagram(format!("timeline render body: {e}")))?;
        if svg.trim().is_empty() {
            return Err(TopicLensError::Diagram("timeline render returned empty body".into()));
        }
        Ok(svg)
    }
}
