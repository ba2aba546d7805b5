//! Canvas Session
//!
//! Owns one editing session: the view options, the selection controller
//! and the last successfully compiled graph. Every document update runs a
//! full build and layout; the latest call wins and a failed build leaves
//! the previous graph on screen.
//!
//! # Example
//!
//! ```
//! use flowcanvas::canvas::CanvasSession;
//! use flowcanvas::workflow::{Step, WorkflowDocument};
//!
//! let mut session = CanvasSession::default();
//! let document = WorkflowDocument::module(vec![Step::bash("scan", "nmap host")]);
//!
//! let canvas = session.update(&document).unwrap();
//! assert_eq!(canvas.nodes.len(), 3);
//! ```

use log::{info, warn};

use super::surface::{to_canvas, CanvasGraph, RenderSurface};
use super::sync::{CanvasSyncController, NodeSelectionChange, SelectionReport};
use crate::config::ViewOptions;
use crate::error::CompileError;
use crate::graph::{CompiledGraph, GraphBuilder, NodeSource};
use crate::layout::{LayeredLayout, LayoutEngine};
use crate::workflow::WorkflowDocument;

pub struct CanvasSession {
    options: ViewOptions,
    builder: GraphBuilder,
    engine: LayeredLayout,
    controller: CanvasSyncController,
    graph: Option<CompiledGraph>,
    canvas: CanvasGraph,
    last_error: Option<CompileError>,
}

impl Default for CanvasSession {
    fn default() -> Self {
        Self::new(ViewOptions::default())
    }
}

impl CanvasSession {
    pub fn new(options: ViewOptions) -> Self {
        Self {
            options,
            builder: GraphBuilder::default(),
            engine: LayeredLayout::default(),
            controller: CanvasSyncController::new(),
            graph: None,
            canvas: CanvasGraph::default(),
            last_error: None,
        }
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    /// Payload of the last successful compile, with selection flags applied.
    pub fn canvas(&self) -> &CanvasGraph {
        &self.canvas
    }

    /// Error from the most recent update, cleared by the next success.
    pub fn last_error(&self) -> Option<&CompileError> {
        self.last_error.as_ref()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.controller.selected_id()
    }

    /// Recompiles `document` and replaces the canvas on success.
    ///
    /// On failure the previous canvas stays in place and the error is both
    /// returned and kept for display.
    pub fn update(&mut self, document: &WorkflowDocument) -> Result<&CanvasGraph, CompileError> {
        let graph = match self.builder.build(document) {
            Ok(graph) => graph,
            Err(err) => {
                warn!("Keeping previous graph: {}", err);
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };

        if let Some(id) = self.controller.selected_id() {
            if !graph.contains(id) {
                info!("Selected node '{}' no longer exists; clearing selection", id);
                self.controller.clear();
            }
        }

        self.graph = Some(graph);
        self.last_error = None;
        self.render();
        Ok(&self.canvas)
    }

    /// Changes the view options and re-lays out the current graph.
    pub fn set_options(&mut self, options: ViewOptions) {
        self.options = options;
        self.render();
    }

    /// Selection request from the side panel.
    pub fn select(&mut self, id: Option<&str>) {
        self.controller.select(id);
        self.canvas.nodes = self.controller.apply_selection(&self.canvas.nodes);
    }

    /// Selection batch from the canvas.
    pub fn on_canvas_selection_change(&mut self, batch: &[NodeSelectionChange]) -> Option<SelectionReport> {
        let report = self.controller.on_canvas_selection_change(batch);
        if report.is_some() {
            self.canvas.nodes = self.controller.apply_selection(&self.canvas.nodes);
        }
        report
    }

    pub fn focus(&self, id: &str, surface: &mut dyn RenderSurface) {
        self.controller.focus_node(id, &self.canvas.nodes, surface);
    }

    /// The step, module or triggers behind the selected node, for the side panel.
    pub fn selected_source(&self) -> Option<&NodeSource> {
        let id = self.controller.selected_id()?;
        self.graph.as_ref()?.node(id).map(|node| &node.source)
    }

    fn render(&mut self) {
        let Some(graph) = &self.graph else {
            return;
        };

        let positioned = self.engine.layout_graph(graph, self.options.orientation);
        let canvas = to_canvas(graph, &positioned, &self.options);
        self.canvas = CanvasGraph {
            nodes: self.controller.apply_selection(&canvas.nodes),
            edges: canvas.edges,
        };

        info!(
            "Canvas ready: {} nodes, {} edges ({})",
            self.canvas.nodes.len(),
            self.canvas.edges.len(),
            self.options.orientation
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NameScope;
    use crate::layout::Orientation;
    use crate::workflow::model::{Step, WorkflowDocument};

    fn chain(names: &[&str]) -> WorkflowDocument {
        WorkflowDocument::module(names.iter().map(|n| Step::bash(*n, "echo")).collect())
    }

    #[test]
    fn test_failed_update_keeps_previous_graph() {
        let mut session = CanvasSession::default();
        session.update(&chain(&["a", "b"])).unwrap();
        let before = session.canvas().clone();

        let err = session.update(&chain(&["scan", "scan"])).unwrap_err();
        assert_eq!(
            err,
            CompileError::DuplicateName {
                scope: NameScope::Step,
                name: "scan".to_string()
            }
        );
        assert_eq!(session.canvas(), &before);
        assert_eq!(session.last_error(), Some(&err));

        session.update(&chain(&["a"])).unwrap();
        assert_eq!(session.last_error(), None);
    }

    #[test]
    fn test_selection_survives_when_id_remains() {
        let mut session = CanvasSession::default();
        session.update(&chain(&["a", "b"])).unwrap();
        session.select(Some("b"));
        assert_eq!(session.canvas().selected_id(), Some("b"));

        session.update(&chain(&["a", "b", "c"])).unwrap();
        assert_eq!(session.selected_id(), Some("b"));
        assert_eq!(session.canvas().selected_id(), Some("b"));
    }

    #[test]
    fn test_selection_cleared_when_id_disappears() {
        let mut session = CanvasSession::default();
        session.update(&chain(&["a", "b"])).unwrap();
        session.select(Some("b"));

        session.update(&chain(&["a"])).unwrap();
        assert_eq!(session.selected_id(), None);
        assert!(session.canvas().nodes.iter().all(|n| !n.selected));
    }

    #[test]
    fn test_canvas_batch_updates_flags() {
        let mut session = CanvasSession::default();
        session.update(&chain(&["a", "b"])).unwrap();

        let report = session.on_canvas_selection_change(&[NodeSelectionChange::selected("a")]);
        assert_eq!(report, Some(SelectionReport::Selected("a".to_string())));
        assert_eq!(session.canvas().selected_id(), Some("a"));
        assert!(matches!(session.selected_source(), Some(NodeSource::Step(step)) if step.name == "a"));
    }

    struct Camera {
        zoom: f64,
        center: Option<(f64, f64, f64)>,
    }

    impl RenderSurface for Camera {
        fn zoom(&self) -> f64 {
            self.zoom
        }

        fn set_center(&mut self, x: f64, y: f64, zoom: f64) {
            self.center = Some((x, y, zoom));
        }
    }

    #[test]
    fn test_focus_centers_on_laid_out_node() {
        let mut session = CanvasSession::default();
        session.update(&chain(&["a", "b"])).unwrap();
        let b = session.canvas().node("b").unwrap().position;

        let mut camera = Camera { zoom: 0.5, center: None };
        session.focus("b", &mut camera);

        assert_eq!(camera.center, Some((b.x + 110.0, b.y + 40.0, 1.0)));
        assert_eq!(session.selected_id(), None);
    }

    #[test]
    fn test_set_options_relayouts() {
        let mut session = CanvasSession::default();
        session.update(&chain(&["a", "b"])).unwrap();
        let tb = session.canvas().node("b").unwrap().position;

        session.set_options(ViewOptions::default().with_orientation(Orientation::LeftToRight));
        let lr = session.canvas().node("b").unwrap().position;
        assert_ne!(tb, lr);
        assert_eq!(session.options().orientation, Orientation::LeftToRight);
    }
}
