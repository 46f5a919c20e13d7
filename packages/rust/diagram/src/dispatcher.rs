//! Classify a request, walk its attempt chain, fall back to the placeholder.

use std::time::Duration;

use reqwest::Client;
use tracing::{info, instrument, warn};

use topiclens_shared::{
    DiagramConfig, DiagramRequest, DiagramResponse, DiagramType, Result, TopicLensError,
    api_key_from_env,
};

use crate::classify::{MermaidTemplate, classify};
use crate::diagramming::DiagrammingClient;
use crate::image::ImageGenerator;
use crate::mermaid::{self, MermaidRenderer};
use crate::placeholder;
use crate::timeline::{TimelineRenderer, timeline_config};

/// Types advertised to callers, in display order.
const SUPPORTED_TYPES: [&str; 5] = [
    "architecture",
    "flowchart",
    "timeline",
    "conceptual",
    "professional",
];

/// One rendering strategy in a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    /// Mermaid code with the template picked by keyword.
    MermaidAuto,
    MermaidFlowchart,
    Timeline,
    Image,
    Diagramming,
}

impl Attempt {
    fn name(self) -> &'static str {
        match self {
            Self::MermaidAuto => "mermaid",
            Self::MermaidFlowchart => "mermaid-flowchart",
            Self::Timeline => "timeline",
            Self::Image => "image",
            Self::Diagramming => "diagramming",
        }
    }
}

/// Attempts tried for a classified type before the placeholder.
fn chain(diagram_type: DiagramType) -> &'static [Attempt] {
    match diagram_type {
        DiagramType::Architecture => &[Attempt::MermaidAuto],
        DiagramType::Flowchart | DiagramType::Workflow => &[Attempt::MermaidFlowchart],
        DiagramType::Timeline => &[Attempt::Timeline],
        DiagramType::Conceptual | DiagramType::Artistic => &[Attempt::Image],
        DiagramType::Professional => &[Attempt::Diagramming, Attempt::MermaidAuto],
        DiagramType::Mermaid | DiagramType::Basic => &[],
    }
}

/// Routes diagram requests to rendering backends. [`dispatch`](Self::dispatch)
/// always produces a response.
pub struct DiagramDispatcher {
    mermaid: MermaidRenderer,
    timeline: TimelineRenderer,
    image: ImageGenerator,
    diagramming: DiagrammingClient,
}

impl DiagramDispatcher {
    /// Build a dispatcher with explicit provider keys.
    pub fn new(
        config: &DiagramConfig,
        image_api_key: Option<String>,
        diagramming_api_key: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TopicLensError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            mermaid: MermaidRenderer::new(client.clone(), config.mermaid_ink_url.clone()),
            timeline: TimelineRenderer::new(client.clone(), config.timeline_render_url.clone()),
            image: ImageGenerator::new(client.clone(), config.image_api_url.clone(), image_api_key),
            diagramming: DiagrammingClient::new(
                client,
                config.diagramming_api_url.clone(),
                diagramming_api_key,
            ),
        })
    }

    /// Build a dispatcher reading provider keys from the configured env vars.
    pub fn from_config(config: &DiagramConfig) -> Result<Self> {
        Self::new(
            config,
            api_key_from_env(&config.image_api_key_env),
            api_key_from_env(&config.diagramming_api_key_env),
        )
    }

    /// Type names advertised to clients.
    pub fn supported_types() -> Vec<&'static str> {
        SUPPORTED_TYPES.to_vec()
    }

    /// Produce a diagram for `request`. Provider failures are logged and the
    /// next attempt runs; the placeholder ends every chain.
    #[instrument(skip_all, fields(description = %request.description))]
    pub async fn dispatch(&self, request: &DiagramRequest) -> DiagramResponse {
        let diagram_type = classify(&request.description);
        info!(%diagram_type, "diagram classified");

        for &attempt in chain(diagram_type) {
            match self.run(attempt, request).await {
                Ok(response) => {
                    info!(provider = %response.provider, "diagram generated");
                    return response;
                }
                Err(e) => warn!(attempt = attempt.name(), error = %e, "diagram attempt failed"),
            }
        }

        info!("using placeholder diagram");
        placeholder::response(request)
    }

    async fn run(&self, attempt: Attempt, request: &DiagramRequest) -> Result<DiagramResponse> {
        match attempt {
            Attempt::MermaidAuto => {
                let code = mermaid::auto_code(&request.description);
                self.mermaid_response(request, DiagramType::Architecture, code)
                    .await
            }
            Attempt::MermaidFlowchart => {
                let code = mermaid::code_for(MermaidTemplate::Flowchart, &request.description);
                self.mermaid_response(request, DiagramType::Flowchart, code)
                    .await
            }
            Attempt::Timeline => {
                let config = timeline_config();
                let svg = self.timeline.render(&config).await?;
                let mut response =
                    DiagramResponse::for_request(request, DiagramType::Timeline, "SVG", "D3.js");
                response.svg_content = Some(svg);
                response.d3_config = Some(config);
                Ok(response)
            }
            Attempt::Image => {
                let url = self.image.generate(&request.description).await?;
                let mut response = DiagramResponse::for_request(
                    request,
                    DiagramType::Conceptual,
                    "PNG",
                    "DALL-E-3",
                );
                response.image_url = Some(url);
                Ok(response)
            }
            Attempt::Diagramming => {
                let document = self.diagramming.create(&request.description).await?;
                let mut response = DiagramResponse::for_request(
                    request,
                    DiagramType::Professional,
                    "SVG",
                    "Lucidchart",
                );
                response.image_url = Some(document.export_url);
                response.document_id = Some(document.id);
                Ok(response)
            }
        }
    }

    async fn mermaid_response(
        &self,
        request: &DiagramRequest,
        diagram_type: DiagramType,
        code: String,
    ) -> Result<DiagramResponse> {
        let svg = self.mermaid.render(&code).await?;
        let mut response = DiagramResponse::for_request(request, diagram_type, "SVG", "Mermaid.js");
        response.svg_content = Some(svg);
        response.mermaid_code = Some(code);
        Ok(response)
    }
}
