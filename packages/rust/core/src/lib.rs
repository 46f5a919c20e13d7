//! Pipeline orchestration for TopicLens.
//!
//! Ties search, page extraction, structured generation and storage into the
//! research and content workflows. Both check the store first and hold a
//! per-topic lock while computing, so a topic is generated at most once.

pub mod content;
pub mod pipeline;
pub mod research;

#[cfg(test)]
mod testing;

pub use content::ContentOrchestrator;
pub use pipeline::{Gathered, ProgressReporter, SilentProgress, Sources, TopicGuard, TopicLocks};
pub use research::ResearchOrchestrator;
