//! Layout Module
//!
//! Assigns canvas coordinates to compiled graph nodes. The algorithm sits
//! behind the [`LayoutEngine`] trait so the canvas does not depend on a
//! particular strategy.
//!
//! - [`layered`]: Sugiyama-style hierarchical layout (the default engine)

pub mod layered;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::graph::node::{has_branching, max_branch_fan_out, CompiledGraph, Edge, Node};

pub use layered::LayeredLayout;

/// Direction in which ranks advance.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Ranks top to bottom
    #[default]
    #[serde(rename = "TB")]
    TopToBottom,
    /// Ranks left to right
    #[serde(rename = "LR")]
    LeftToRight,
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "TB" => Ok(Self::TopToBottom),
            "LR" => Ok(Self::LeftToRight),
            other => Err(format!("Unknown orientation '{}' (expected TB or LR)", other)),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopToBottom => write!(f, "TB"),
            Self::LeftToRight => write!(f, "LR"),
        }
    }
}

/// Top-left corner of a node on the canvas.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A graph node annotated with its position.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    pub node: Node,
    pub position: Position,
}

/// Computes node positions; must be deterministic and free of hidden state.
pub trait LayoutEngine {
    fn layout(&self, nodes: &[Node], edges: &[Edge], orientation: Orientation) -> Vec<PositionedNode>;

    fn layout_graph(&self, graph: &CompiledGraph, orientation: Orientation) -> Vec<PositionedNode> {
        self.layout(&graph.nodes, &graph.edges, orientation)
    }
}

/// Separations used for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    /// Gap between neighbours in the same rank
    pub node_sep: f64,
    /// Gap between consecutive ranks
    pub rank_sep: f64,
}

/// Node size and spacing rules.
///
/// Graphs with branching edges get wider gaps, growing with the fan-out of
/// the busiest decision point so edge labels stay readable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingConfig {
    pub node_width: f64,
    pub node_height: f64,
    pub node_sep: f64,
    pub rank_sep: f64,
    pub branch_node_sep: f64,
    pub branch_rank_sep: f64,
    pub fan_out_node_step: f64,
    pub fan_out_rank_step: f64,
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self {
            node_width: 220.0,
            node_height: 80.0,
            node_sep: 50.0,
            rank_sep: 70.0,
            branch_node_sep: 80.0,
            branch_rank_sep: 110.0,
            fan_out_node_step: 30.0,
            fan_out_rank_step: 20.0,
        }
    }
}

impl SpacingConfig {
    /// Spacing for an edge set.
    pub fn spacing_for(&self, edges: &[Edge]) -> Spacing {
        if has_branching(edges) {
            self.branching_spacing(max_branch_fan_out(edges))
        } else {
            Spacing {
                node_sep: self.node_sep,
                rank_sep: self.rank_sep,
            }
        }
    }

    /// Spacing for a graph whose busiest decision point has `fan_out` branch edges.
    pub fn branching_spacing(&self, fan_out: usize) -> Spacing {
        let extra = fan_out.saturating_sub(1) as f64;
        Spacing {
            node_sep: self.branch_node_sep + extra * self.fan_out_node_step,
            rank_sep: self.branch_rank_sep + extra * self.fan_out_rank_step,
        }
    }
}
