//! Canvas Module
//!
//! Everything between a positioned graph and the drawing layer.
//!
//! - [`surface`]: Render payload and the camera trait of the drawing layer
//! - [`sync`]: Selection state shared with the side panel
//! - [`session`]: One editing session, recomputed on every document change

pub mod session;
pub mod surface;
pub mod sync;

pub use session::CanvasSession;
pub use surface::{to_canvas, CanvasEdge, CanvasGraph, CanvasNode, EdgeStyle, NodeData, RenderSurface};
pub use sync::{CanvasSyncController, NodeSelectionChange, Selection, SelectionReport, MIN_FOCUS_ZOOM};
