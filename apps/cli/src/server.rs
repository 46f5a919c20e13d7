//! JSON HTTP API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/content/generate` | Generate (or recall) an article for `{topic}` |
//! | `POST` | `/api/content/regenerate/{id}` | Discard `id`, generate `{topic}` again |
//! | `PUT`  | `/api/content/edit/{id}` | Replace title, body and summary |
//! | `PUT`  | `/api/content/approve/{id}` | Mark approved |
//! | `GET`  | `/api/content/history` | All articles, newest first |
//! | `GET`  | `/api/content/{id}` | One article |
//! | `POST` | `/api/research/query` | Research (or recall) `{topic}` |
//! | `POST` | `/api/diagrams/generate` | Render a diagram request |
//! | `GET`  | `/api/diagrams/types` | Supported diagram types |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Failures answer 400 with `{"error": "..."}`; unknown ids answer 404.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use color_eyre::eyre::Result;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use topiclens_core::SilentProgress;
use topiclens_diagram::DiagramDispatcher;
use topiclens_shared::{
    ContentEdit, ContentRecord, DiagramRequest, DiagramResponse, RecordId, ResearchRecord,
    TopicLensError,
};

use crate::app::App;

/// Shared state handed to every handler.
#[derive(Clone)]
struct AppState {
    app: Arc<App>,
}

/// Bind `bind` and serve until the process exits.
pub(crate) async fn serve(app: App, bind: &str) -> Result<()> {
    let router = router(Arc::new(app));
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(bind, "HTTP API listening");
    println!("TopicLens API listening on http://{bind}");
    axum::serve(listener, router).await?;
    Ok(())
}

fn router(app: Arc<App>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/content/generate", post(handle_content_generate))
        .route("/api/content/regenerate/{id}", post(handle_content_regenerate))
        .route("/api/content/edit/{id}", put(handle_content_edit))
        .route("/api/content/approve/{id}", put(handle_content_approve))
        .route("/api/content/history", get(handle_content_history))
        .route("/api/content/{id}", get(handle_content_get))
        .route("/api/research/query", post(handle_research))
        .route("/api/diagrams/generate", post(handle_diagram_generate))
        .route("/api/diagrams/types", get(handle_diagram_types))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { app })
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<TopicLensError> for AppError {
    fn from(e: TopicLensError) -> Self {
        warn!(error = %e, "request failed");
        bad_request(e.to_string())
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

fn not_found(id: &RecordId) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        message: format!("content {id} not found"),
    }
}

fn parse_id(raw: &str) -> Result<RecordId, AppError> {
    raw.parse()
        .map_err(|_| bad_request(format!("invalid id '{raw}'")))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct TopicBody {
    topic: String,
}

async fn handle_content_generate(
    State(state): State<AppState>,
    Json(body): Json<TopicBody>,
) -> Result<Json<ContentRecord>, AppError> {
    let record = state.app.content.generate(&body.topic, &SilentProgress).await?;
    Ok(Json(record))
}

async fn handle_content_regenerate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<TopicBody>,
) -> Result<Json<ContentRecord>, AppError> {
    let id = parse_id(&id)?;
    let record = state
        .app
        .content
        .regenerate(&id, &body.topic, &SilentProgress)
        .await?;
    Ok(Json(record))
}

async fn handle_content_edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(edit): Json<ContentEdit>,
) -> Result<Json<ContentRecord>, AppError> {
    let id = parse_id(&id)?;
    match state.app.content.edit(&id, edit).await? {
        Some(record) => Ok(Json(record)),
        None => Err(not_found(&id)),
    }
}

async fn handle_content_approve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContentRecord>, AppError> {
    let id = parse_id(&id)?;
    match state.app.content.approve(&id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(not_found(&id)),
    }
}

async fn handle_content_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContentRecord>>, AppError> {
    Ok(Json(state.app.content.history().await?))
}

async fn handle_content_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContentRecord>, AppError> {
    let id = parse_id(&id)?;
    match state.app.content.get(&id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(not_found(&id)),
    }
}

async fn handle_research(
    State(state): State<AppState>,
    Json(body): Json<TopicBody>,
) -> Result<Json<ResearchRecord>, AppError> {
    let record = state.app.research.run(&body.topic, &SilentProgress).await?;
    Ok(Json(record))
}

async fn handle_diagram_generate(
    State(state): State<AppState>,
    Json(request): Json<DiagramRequest>,
) -> Json<DiagramResponse> {
    Json(state.app.diagrams.dispatch(&request).await)
}

async fn handle_diagram_types() -> Json<Vec<&'static str>> {
    Json(DiagramDispatcher::supported_types())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
