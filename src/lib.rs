//! # FlowWeave
//!
//! Flowchart generation over HTTP: arrow-delimited text, a natural-language
//! prompt, or an uploaded image/PDF in; a renderable node/edge graph out.
//!
//! ## Generation Paths
//!
//! - **Text**: [`text_parser::parse`] is deterministic and local.
//! - **Prompt**: [`prompt_service::PromptGraphService`] asks a text model.
//! - **Image**: [`image_service::ImageGraphService`] asks a vision model.
//!
//! Model output goes through [`normalizer`], which passes the embedded JSON
//! through untouched or substitutes a fixed `Start -> ... -> End` fallback.
//!
//! ## Quick Start
//!
//! ```rust
//! use flowweave::text_parser::parse;
//!
//! let graph = parse("Start -> Check? -> End");
//! assert_eq!(graph.nodes.len(), 3);
//! assert_eq!(graph.edges.len(), 2);
//! ```

// Documentation enforcement - treat missing docs as errors
#![deny(missing_docs)]

/// Service configuration.
pub mod config;
/// Error taxonomy.
pub mod error;
/// Graph data model.
pub mod graph;
/// Image and PDF generation path.
pub mod image_service;
/// Chat-completions client.
pub mod llm;
/// Node kinds and label classification.
pub mod node_kind;
/// Model response normalization and fallback graphs.
pub mod normalizer;
/// Prompt generation path.
pub mod prompt_service;
/// HTTP API.
pub mod server;
/// Node styles.
pub mod style;
/// Arrow-delimited text parser.
pub mod text_parser;

pub use error::{FlowError, Result};
pub use graph::{Edge, Flowchart, Graph, GraphMetadata, GraphSource, Node, StyleRecord};
pub use node_kind::NodeKind;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod prompt_service_test;
