//! Mermaid code templates and rendering through a mermaid.ink-style service.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use reqwest::Client;
use tracing::debug;

use topiclens_shared::{Result, TopicLensError};

use crate::classify::{MermaidTemplate, mermaid_template};

/// Mermaid code for `description`, template picked by keyword.
pub fn auto_code(description: &str) -> String {
    code_for(mermaid_template(description), description)
}

/// Mermaid code for `description` using a specific template.
pub fn code_for(template: MermaidTemplate, description: &str) -> String {
    match template {
        MermaidTemplate::Architecture => architecture_code(description),
        MermaidTemplate::Class => class_code(description),
        MermaidTemplate::Sequence => sequence_code(description),
        MermaidTemplate::Flowchart => flowchart_code(description),
    }
}

/// Description reduced to ASCII alphanumerics, usable as a Mermaid identifier.
fn identifier(description: &str) -> String {
    description
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

fn flowchart_code(description: &str) -> String {
    format!(
        r#"flowchart TD
    A[Start: {description}] --> B{{Analysis}}
    B -->|Yes| C[Process Data]
    B -->|No| D[Collect More Info]
    C --> E[Generate Results]
    D --> B
    E --> F[End: Complete]

    style A fill:#e1f5fe
    style F fill:#e8f5e8
    style B fill:#fff3e0
    style C fill:#f3e5f5
    style D fill:#fce4ec
    style E fill:#e0f2f1
"#
    )
}

fn architecture_code(description: &str) -> String {
    format!(
        r#"graph TB
    subgraph "Frontend Layer"
        UI[User Interface]
        API[API Gateway]
    end

    subgraph "Application Layer"
        SERVICE[{description} Service]
        PROCESSOR[Data Processor]
    end

    subgraph "Data Layer"
        DB[(Database)]
        CACHE[(Cache)]
    end

    UI --> API
    API --> SERVICE
    SERVICE --> PROCESSOR
    PROCESSOR --> DB
    SERVICE --> CACHE

    style UI fill:#e3f2fd
    style SERVICE fill:#f3e5f5
    style DB fill:#e8f5e8
"#
    )
}

fn class_code(description: &str) -> String {
    let id = identifier(description);
    format!(
        r#"classDiagram
    class {id}System {{
        +String id
        +String name
        +Date createdAt
        +process()
        +validate()
        +save()
    }}

    class DataProcessor {{
        +analyzeData()
        +transformData()
        +exportResults()
    }}

    class ConfigManager {{
        +loadConfig()
        +updateSettings()
    }}

    {id}System --> DataProcessor
    {id}System --> ConfigManager
"#
    )
}

fn sequence_code(description: &str) -> String {
    let id = identifier(description);
    format!(
        r#"sequenceDiagram
    participant User
    participant Frontend
    participant API
    participant {id}Service
    participant Database

    User->>Frontend: Request {description}
    Frontend->>API: HTTP Request
    API->>{id}Service: Process Request
    {id}Service->>Database: Query Data
    Database-->>{id}Service: Return Results
    {id}Service-->>API: Processed Data
    API-->>Frontend: JSON Response
    Frontend-->>User: Display Results
"#
    )
}

/// Renders Mermaid code to SVG via `GET {base}/svg/{base64url(code)}`.
pub struct MermaidRenderer {
    client: Client,
    base_url: String,
}

impl MermaidRenderer {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn render_url(&self, code: &str) -> String {
        format!(
            "{}/svg/{}",
            self.base_url.trim_end_matches('/'),
            URL_SAFE.encode(code.as_bytes())
        )
    }

    /// Render `code`, returning the SVG markup.
    pub async fn render(&self, code: &str) -> Result<String> {
        let url = self.render_url(code);
        debug!(chars = code.len(), "rendering mermaid code");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TopicLensError::Diagram(format!("mermaid render request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TopicLensError::Diagram(format!("mermaid render HTTP {status}")));
        }

        let svg = response
            .text()
            .await
            .map_err(|e| TopicLensError::Diagram(format!("mermaid render body: {e}")))?;

        if svg.trim().is_empty() {
            return Err(TopicLensError::Diagram("mermaid render returned empty body".into()));
        }
        Ok(svg)
    }
}
