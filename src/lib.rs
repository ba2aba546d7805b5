//! FlowCanvas - Workflow Graph Compiler and Layout Engine
//!
//! Turns declarative security-scan workflow documents (typed steps,
//! sub-modules, triggers and branching rules) into positioned graphs ready
//! for a node-based canvas, with compact and redacted summaries on every
//! node.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`workflow`]: Data model, YAML loading and structural validation
//! - [`summary`]: Per-kind display lines with truncation and redaction
//! - [`graph`]: Compilation of a document into nodes and classified edges
//! - [`layout`]: Deterministic layered layout
//! - [`canvas`]: Render payload, selection sync and editing sessions
//! - [`config`]: View options
//! - [`error`]: Typed load and compile errors
//!
//! # Example
//!
//! ```rust,no_run
//! use flowcanvas::{build, load_document, to_canvas, LayeredLayout, LayoutEngine, ViewOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load a workflow from YAML
//!     let document = load_document("recon.yaml")?;
//!
//!     // Compile and lay out
//!     let graph = build(&document)?;
//!     let options = ViewOptions::default();
//!     let positioned = LayeredLayout::default().layout_graph(&graph, options.orientation);
//!
//!     // Hand the payload to the drawing layer
//!     let canvas = to_canvas(&graph, &positioned, &options);
//!     println!("{}", serde_json::to_string_pretty(&canvas)?);
//!     Ok(())
//! }
//! ```

pub mod canvas;
pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod summary;
pub mod workflow;

// Re-export commonly used types
pub use canvas::{to_canvas, CanvasGraph, CanvasSession, CanvasSyncController};
pub use config::ViewOptions;
pub use error::{CompileError, LoadError};
pub use graph::{build, CompiledGraph, Edge, Node};
pub use layout::{LayeredLayout, LayoutEngine, Orientation, Position};
pub use workflow::{load_document, parse_document, validate_document, WorkflowDocument};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "FlowCanvas";
