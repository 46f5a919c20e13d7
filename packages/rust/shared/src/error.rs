//! Error types for TopicLens.
//!
//! Library crates use [`TopicLensError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all TopicLens operations.
#[derive(Debug, thiserror::Error)]
pub enum TopicLensError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while talking to a provider or fetching a page.
    #[error("network error: {0}")]
    Network(String),

    /// HTML or JSON parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Web-search provider failure. Always aborts the pipeline.
    #[error("search failed: {0}")]
    Search(String),

    /// Generative-text provider failure (transport, status, or empty reply).
    #[error("generation error: {0}")]
    Generation(String),

    /// A single diagram rendering attempt failed.
    #[error("diagram error: {0}")]
    Diagram(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Strict research mode found no usable page for the topic.
    #[error("no information found for '{topic}'")]
    NoInformation { topic: String },

    /// A pipeline run failed; carries the topic and the originating cause.
    #[error("{pipeline} failed for topic '{topic}': {source}")]
    Pipeline {
        pipeline: &'static str,
        topic: String,
        #[source]
        source: Box<TopicLensError>,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TopicLensError>;

impl TopicLensError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a failure surfaced by a pipeline run.
    pub fn pipeline(pipeline: &'static str, topic: impl Into<String>, source: Self) -> Self {
        Self::Pipeline {
            pipeline,
            topic: topic.into(),
            source: Box::new(source),
        }
    }
}
