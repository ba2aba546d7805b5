//! Workflow Graph Module
//!
//! Compiles workflow documents into typed nodes and classified edges.
//!
//! - [`node`]: Node/edge types and edge classification
//! - [`builder`]: Document-to-graph compilation

pub mod builder;
pub mod node;

pub use builder::{build, GraphBuilder};
pub use node::{
    branch_out_degrees, has_branching, is_branching, max_branch_fan_out, CompiledGraph, Edge,
    Node, NodeKind, NodeSource, StepKind, END_ID, START_ID, TRIGGERS_ID,
};
