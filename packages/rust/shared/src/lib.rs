//! Shared types, error model, and configuration for TopicLens.
//!
//! This crate is the foundation depended on by all other TopicLens crates.
//! It provides:
//! - [`TopicLensError`], the unified error type
//! - Domain types ([`ResearchRecord`], [`ContentRecord`], [`DiagramRequest`], [`RecordId`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, DiagramConfig, ExtractConfig, OpenRouterConfig, SearchConfig,
    ServerConfig, api_key_from_env, config_dir, config_file_path, init_config, load_config,
    load_config_from, validate_api_key,
};
pub use error::{Result, TopicLensError};
pub use types::{
    ContentEdit, ContentRecord, ContentStatus, DiagramRequest, DiagramResponse, DiagramType,
    RecordId, ResearchMode, ResearchRecord, SearchMetadata, SearchResponse, SearchResult,
    topic_key,
};
