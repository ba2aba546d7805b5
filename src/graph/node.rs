//! Graph Nodes and Edges
//!
//! Output types of the graph builder. Nodes are created fresh on every
//! compile pass and never mutated afterwards; consumers diff by id.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::workflow::model::{Module, Step, StepBody, Trigger};

/// Id of the synthesized entry node.
pub const START_ID: &str = "__start__";

/// Id of the synthesized terminal node.
pub const END_ID: &str = "__end__";

/// Id of the node aggregating every trigger.
pub const TRIGGERS_ID: &str = "__triggers__";

/// Ids no step or module may use as a name.
pub const RESERVED_IDS: [&str; 3] = [START_ID, END_ID, TRIGGERS_ID];

/// Step kind as seen by the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Bash,
    RemoteBash,
    Container,
    Parallel,
    ParallelSteps,
    Function,
    Foreach,
    Http,
    Llm,
    Override,
    Unknown,
}

impl StepKind {
    pub fn of(body: &StepBody) -> Self {
        match body {
            StepBody::Bash(_) => Self::Bash,
            StepBody::RemoteBash(_) => Self::RemoteBash,
            StepBody::Container(_) => Self::Container,
            StepBody::Parallel(_) => Self::Parallel,
            StepBody::ParallelSteps(_) => Self::ParallelSteps,
            StepBody::Function(_) => Self::Function,
            StepBody::Foreach(_) => Self::Foreach,
            StepBody::Http(_) => Self::Http,
            StepBody::Llm(_) => Self::Llm,
            StepBody::Override(_) => Self::Override,
            StepBody::Unknown { .. } => Self::Unknown,
        }
    }

    /// Node type the rendering surface knows how to draw.
    pub fn render_type(self) -> &'static str {
        match self {
            Self::Bash | Self::RemoteBash => "bash",
            Self::Container | Self::Unknown => "container",
            Self::Parallel | Self::ParallelSteps => "parallel",
            Self::Function => "function",
            Self::Foreach => "foreach",
            Self::Http => "http",
            Self::Llm => "llm",
            Self::Override => "override",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Start,
    End,
    Trigger,
    Module,
    Step(StepKind),
}

impl NodeKind {
    pub fn render_type(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Trigger => "trigger",
            Self::Module => "module",
            Self::Step(kind) => kind.render_type(),
        }
    }
}

/// The entity a node was compiled from, kept for the side panel.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeSource {
    Start,
    End,
    Step(Step),
    Module(Module),
    Triggers(Vec<Trigger>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub summary_lines: Vec<String>,
    pub source: NodeSource,
}

impl Node {
    /// Human label; synthesized nodes get a fixed caption.
    pub fn label(&self) -> &str {
        match self.kind {
            NodeKind::Start => "Start",
            NodeKind::End => "End",
            NodeKind::Trigger => "Triggers",
            NodeKind::Module | NodeKind::Step(_) => &self.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    /// Produced by a decision rule
    pub branch: bool,
    pub label: Option<String>,
}

impl Edge {
    pub fn sequential(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            branch: false,
            label: None,
        }
    }

    pub fn branch(source: impl Into<String>, target: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            branch: true,
            label: Some(label.into()),
        }
    }

    /// Stable id; unique because (source, target, label) never repeats.
    ///
    /// Separator characters inside the parts are percent-escaped so two
    /// different edges never share an id.
    pub fn id(&self) -> String {
        let source = escape_id_part(&self.source);
        let target = escape_id_part(&self.target);
        match &self.label {
            Some(label) => format!("{}->{}:{}", source, target, escape_id_part(label)),
            None => format!("{}->{}", source, target),
        }
    }

    pub fn has_label(&self) -> bool {
        self.label.as_deref().is_some_and(|l| !l.is_empty())
    }
}

fn escape_id_part(part: &str) -> Cow<'_, str> {
    if !part.contains(['%', ':', '>']) {
        return Cow::Borrowed(part);
    }
    let mut escaped = String::with_capacity(part.len() + 4);
    for c in part.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            ':' => escaped.push_str("%3A"),
            '>' => escaped.push_str("%3E"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Nodes and edges from one compile pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl CompiledGraph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source == id)
    }
}

/// Number of branch edges leaving each node.
pub fn branch_out_degrees(edges: &[Edge]) -> HashMap<&str, usize> {
    let mut degrees: HashMap<&str, usize> = HashMap::new();
    for edge in edges.iter().filter(|e| e.branch) {
        *degrees.entry(edge.source.as_str()).or_insert(0) += 1;
    }
    degrees
}

/// Largest number of branch edges leaving a single node.
pub fn max_branch_fan_out(edges: &[Edge]) -> usize {
    branch_out_degrees(edges).values().copied().max().unwrap_or(0)
}

/// An edge is branching when it carries a label or leaves a node with more
/// than one branch edge. Derived from the edge set, never stored.
pub fn is_branching(edge: &Edge, degrees: &HashMap<&str, usize>) -> bool {
    edge.has_label() || degrees.get(edge.source.as_str()).copied().unwrap_or(0) > 1
}

pub fn has_branching(edges: &[Edge]) -> bool {
    let degrees = branch_out_degrees(edges);
    edges.iter().any(|e| is_branching(e, &degrees))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_step_renders_as_container() {
        let body = StepBody::Unknown {
            type_name: "quantum".to_string(),
        };
        assert_eq!(NodeKind::Step(StepKind::of(&body)).render_type(), "container");
    }

    #[test]
    fn test_render_types_are_in_known_set() {
        let known = [
            "start", "end", "trigger", "bash", "parallel", "function", "foreach", "http", "llm",
            "container", "module", "override",
        ];
        let kinds = [
            StepKind::Bash,
            StepKind::RemoteBash,
            StepKind::Container,
            StepKind::Parallel,
            StepKind::ParallelSteps,
            StepKind::Function,
            StepKind::Foreach,
            StepKind::Http,
            StepKind::Llm,
            StepKind::Override,
            StepKind::Unknown,
        ];
        for kind in kinds {
            assert!(known.contains(&kind.render_type()));
        }
        for kind in [NodeKind::Start, NodeKind::End, NodeKind::Trigger, NodeKind::Module] {
            assert!(known.contains(&kind.render_type()));
        }
    }

    #[test]
    fn test_edge_ids() {
        assert_eq!(Edge::sequential("a", "b").id(), "a->b");
        assert_eq!(Edge::branch("a", "b", "x==1").id(), "a->b:x==1");
    }

    #[test]
    fn test_edge_ids_escape_separators() {
        let sequential = Edge::sequential("a", "b:x");
        let branch = Edge::branch("a", "b", "x");
        assert_ne!(sequential.id(), branch.id());
        assert_eq!(sequential.id(), "a->b%3Ax");
        assert_eq!(Edge::branch("a", "b", "n > 0").id(), "a->b:n %3E 0");
        assert_ne!(Edge::sequential("a->b", "c").id(), Edge::sequential("a", "b->c").id());
    }

    #[test]
    fn test_branch_classification() {
        let edges = vec![
            Edge::sequential("s", "a"),
            Edge::branch("a", "b", "x==1"),
            Edge::branch("a", "c", "x==2"),
            Edge::sequential("b", "d"),
        ];
        let degrees = branch_out_degrees(&edges);

        assert!(!is_branching(&edges[0], &degrees));
        assert!(is_branching(&edges[1], &degrees));
        assert!(!is_branching(&edges[3], &degrees));
        assert_eq!(max_branch_fan_out(&edges), 2);
        assert!(has_branching(&edges));
    }

    #[test]
    fn test_no_branching_in_plain_chain() {
        let edges = vec![Edge::sequential("a", "b"), Edge::sequential("b", "c")];
        assert_eq!(max_branch_fan_out(&edges), 0);
        assert!(!has_branching(&edges));
    }
}
