//! Canvas Sync Controller
//!
//! Owns the single selected node id shared by the canvas and the side
//! panel. The id is the only mutable state of a session; node flags are
//! re-derived from it on every pass and never written in place.
//!
//! # State Machine
//!
//! ```text
//! NoSelection <--> NodeSelected(id)
//! ```
//!
//! Transitions happen only on an external request ([`CanvasSyncController::select`]),
//! a canvas selection batch ([`CanvasSyncController::on_canvas_selection_change`])
//! or an explicit [`CanvasSyncController::clear`].

use log::{debug, warn};

use super::surface::{CanvasNode, RenderSurface};
use crate::layout::SpacingConfig;

/// Lowest zoom level a focused node is shown at.
pub const MIN_FOCUS_ZOOM: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Node(String),
}

impl Selection {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Node(id) => Some(id.as_str()),
        }
    }
}

/// One entry of a selection-change batch emitted by the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSelectionChange {
    pub id: String,
    pub selected: bool,
}

impl NodeSelectionChange {
    pub fn selected(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            selected: true,
        }
    }

    pub fn deselected(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            selected: false,
        }
    }
}

/// What the owner of the selection is told after a canvas batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionReport {
    Selected(String),
    Cleared,
}

#[derive(Debug, Clone)]
pub struct CanvasSyncController {
    selection: Selection,
    /// Node size used when the surface has not measured a node yet
    fallback_size: (f64, f64),
}

impl Default for CanvasSyncController {
    fn default() -> Self {
        let spacing = SpacingConfig::default();
        Self {
            selection: Selection::None,
            fallback_size: (spacing.node_width, spacing.node_height),
        }
    }
}

impl CanvasSyncController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selection.id()
    }

    /// External selection request, typically from the side panel.
    pub fn select(&mut self, id: Option<&str>) {
        self.selection = match id {
            Some(id) => Selection::Node(id.to_string()),
            None => Selection::None,
        };
        debug!("Selection set externally: {:?}", self.selection);
    }

    pub fn clear(&mut self) {
        self.selection = Selection::None;
    }

    /// Fresh copies of `nodes` with `selected` derived from the current id.
    pub fn apply_selection(&self, nodes: &[CanvasNode]) -> Vec<CanvasNode> {
        let selected = self.selected_id();
        nodes
            .iter()
            .map(|node| CanvasNode {
                selected: selected == Some(node.id.as_str()),
                ..node.clone()
            })
            .collect()
    }

    /// Reconciles a selection batch coming from the canvas.
    ///
    /// A batch that only deselects clears the selection when it deselects
    /// the currently selected node; stale deselects of other nodes are
    /// ignored. Returns what changed, if anything.
    pub fn on_canvas_selection_change(&mut self, batch: &[NodeSelectionChange]) -> Option<SelectionReport> {
        if let Some(change) = batch.iter().rev().find(|c| c.selected) {
            if self.selected_id() == Some(change.id.as_str()) {
                return None;
            }
            self.selection = Selection::Node(change.id.clone());
            debug!("Canvas selected '{}'", change.id);
            return Some(SelectionReport::Selected(change.id.clone()));
        }

        let current = self.selected_id()?;
        if !batch.iter().any(|c| c.id == current) {
            return None;
        }

        self.selection = Selection::None;
        debug!("Canvas cleared the selection");
        Some(SelectionReport::Cleared)
    }

    /// Centers the surface on a node without touching the selection.
    ///
    /// The zoom is raised to [`MIN_FOCUS_ZOOM`] when below it and otherwise
    /// left as the user set it.
    pub fn focus_node(&self, id: &str, nodes: &[CanvasNode], surface: &mut dyn RenderSurface) {
        let Some(node) = nodes.iter().find(|n| n.id == id) else {
            warn!("Cannot focus unknown node '{}'", id);
            return;
        };

        let (width, height) = surface.measured_size(id).unwrap_or(self.fallback_size);
        let x = node.position.x + width / 2.0;
        let y = node.position.y + height / 2.0;
        let zoom = surface.zoom().max(MIN_FOCUS_ZOOM);

        debug!("Focusing '{}' at ({:.1}, {:.1}) zoom {:.2}", id, x, y, zoom);
        surface.set_center(x, y, zoom);
    }
}
