//! Diagram generation for TopicLens.
//!
//! A free-text description is classified by keyword, then routed through a
//! chain of rendering backends (Mermaid, a D3 timeline service, AI images, a
//! diagramming service). An SVG placeholder closes every chain, so
//! [`DiagramDispatcher::dispatch`] never fails.

pub mod classify;
pub mod diagramming;
pub mod dispatcher;
pub mod image;
pub mod mermaid;
pub mod placeholder;
pub mod timeline;

pub use classify::{MermaidTemplate, classify, mermaid_template};
pub use dispatcher::DiagramDispatcher;
