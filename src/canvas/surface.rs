//! Rendering Surface Payload
//!
//! The node and edge lists handed to the drawing layer. Node `type` is
//! always one of the render types the surface knows how to draw, and every
//! edge carries a stable id plus a style derived from its classification.

use std::collections::HashMap;

use log::{debug, warn};
use serde::Serialize;

use crate::config::ViewOptions;
use crate::graph::node::{branch_out_degrees, is_branching, CompiledGraph, NodeKind};
use crate::layout::{Position, PositionedNode};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyle {
    Sequential,
    Branch,
}

/// Display data attached to each node.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub label: String,
    pub summary_lines: Vec<String>,
    pub wrap: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CanvasNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub position: Position,
    pub data: NodeData,
    pub selected: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CanvasEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub style: EdgeStyle,
}

/// What the drawing layer receives on every render pass.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct CanvasGraph {
    pub nodes: Vec<CanvasNode>,
    pub edges: Vec<CanvasEdge>,
}

impl CanvasGraph {
    pub fn node(&self, id: &str) -> Option<&CanvasNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.nodes.iter().find(|n| n.selected).map(|n| n.id.as_str())
    }
}

/// The camera side of the drawing layer.
pub trait RenderSurface {
    fn zoom(&self) -> f64;

    fn set_center(&mut self, x: f64, y: f64, zoom: f64);

    /// Size the surface measured for a node, when it has drawn it.
    fn measured_size(&self, _id: &str) -> Option<(f64, f64)> {
        None
    }
}

/// Builds the render payload from a compiled graph and its layout.
///
/// Nodes keep the graph's order; none starts out selected.
pub fn to_canvas(graph: &CompiledGraph, positioned: &[PositionedNode], options: &ViewOptions) -> CanvasGraph {
    let positions: HashMap<&str, Position> = positioned
        .iter()
        .map(|p| (p.node.id.as_str(), p.position))
        .collect();

    let nodes = graph
        .nodes
        .iter()
        .map(|node| {
            let position = positions.get(node.id.as_str()).copied().unwrap_or_else(|| {
                warn!("Node '{}' has no layout position", node.id);
                Position::default()
            });
            let summary_lines = if options.show_details {
                node.summary_lines.clone()
            } else {
                Vec::new()
            };

            CanvasNode {
                id: node.id.clone(),
                node_type: node.kind.render_type().to_string(),
                position,
                data: NodeData {
                    label: node.label().to_string(),
                    summary_lines,
                    wrap: options.wrap_long_text,
                },
                selected: false,
            }
        })
        .collect();

    let degrees = branch_out_degrees(&graph.edges);
    let edges = graph
        .edges
        .iter()
        .map(|edge| CanvasEdge {
            id: edge.id(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            label: edge.label.clone().filter(|l| !l.is_empty()),
            style: if is_branching(edge, &degrees) {
                EdgeStyle::Branch
            } else {
                EdgeStyle::Sequential
            },
        })
        .collect();

    let unknown = graph
        .nodes
        .iter()
        .filter(|n| matches!(n.kind, NodeKind::Step(kind) if kind.render_type() == "container"))
        .count();
    debug!("Canvas payload: {} nodes ({} as container), {} edges", graph.nodes.len(), unknown, graph.edges.len());

    CanvasGraph { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build;
    use crate::layout::{LayeredLayout, LayoutEngine};
    use crate::workflow::model::{DecisionCase, DecisionRule, Step, WorkflowDocument};

    fn compile(document: &WorkflowDocument, options: &ViewOptions) -> CanvasGraph {
        let graph = build(document).unwrap();
        let positioned = LayeredLayout::default().layout_graph(&graph, options.orientation);
        to_canvas(&graph, &positioned, options)
    }

    fn branching_document() -> WorkflowDocument {
        WorkflowDocument::module(vec![
            Step::bash("a", "echo hi").with_decision(DecisionRule::Conditions(vec![
                DecisionCase::new("x==1", "b"),
                DecisionCase::new("x==2", "c"),
            ])),
            Step::bash("b", "echo b"),
            Step::bash("c", "echo c"),
        ])
    }

    #[test]
    fn test_node_payload() {
        let canvas = compile(&branching_document(), &ViewOptions::default());

        let a = canvas.node("a").unwrap();
        assert_eq!(a.node_type, "bash");
        assert_eq!(a.data.label, "a");
        assert_eq!(a.data.summary_lines, vec!["echo hi".to_string()]);
        assert!(!a.selected);
        assert_eq!(canvas.node("__start__").unwrap().node_type, "start");
        assert_eq!(canvas.selected_id(), None);
    }

    #[test]
    fn test_edge_styles() {
        let canvas = compile(&branching_document(), &ViewOptions::default());

        let branch = canvas.edges.iter().find(|e| e.id == "a->b:x==1").unwrap();
        assert_eq!(branch.style, EdgeStyle::Branch);
        assert_eq!(branch.label.as_deref(), Some("x==1"));

        let entry = canvas.edges.iter().find(|e| e.id == "__start__->a").unwrap();
        assert_eq!(entry.style, EdgeStyle::Sequential);
        assert_eq!(entry.label, None);
    }

    #[test]
    fn test_hidden_details_drop_summaries() {
        let options = ViewOptions::default().with_details(false);
        let canvas = compile(&branching_document(), &options);
        assert!(canvas.nodes.iter().all(|n| n.data.summary_lines.is_empty()));
    }

    #[test]
    fn test_json_shape() {
        let canvas = compile(&branching_document(), &ViewOptions::default());
        let json = serde_json::to_value(&canvas).unwrap();

        let node = &json["nodes"][1];
        assert_eq!(node["type"], "bash");
        assert!(node["position"]["x"].is_number());
        assert!(node["data"]["summaryLines"].is_array());
        assert_eq!(json["edges"][0]["style"], "sequential");
        assert!(json["edges"][0].get("label").is_none());
    }
}
