//! Graph Builder
//!
//! Compiles a [`WorkflowDocument`] into a flat list of nodes and edges at
//! top-level control-flow granularity: `parallel` and `foreach` steps stay a
//! single node, modules stay opaque, and all triggers collapse into one node.
//!
//! Chaining rules:
//! - Each entity follows the previous one with a sequential edge, unless the
//!   previous entity has a decision rule (its branch edges replace chaining)
//! - In flows, a module with `depends_on` gets one edge per dependency and
//!   no positional edge
//! - Entities left without an outgoing edge flow into the end node

use std::collections::HashSet;

use log::{debug, info, warn};

use super::node::{
    CompiledGraph, Edge, Node, NodeKind, NodeSource, StepKind, END_ID, START_ID, TRIGGERS_ID,
};
use crate::error::CompileError;
use crate::summary::{triggers_summary, Summarizer, SummaryOptions};
use crate::workflow::model::{DecisionRule, StepBody, WorkflowDocument, WorkflowKind};
use crate::workflow::validator::check_document;

/// Compiles a document with the default summary options.
///
/// # Example
///
/// ```
/// use flowcanvas::graph::build;
/// use flowcanvas::workflow::{Step, WorkflowDocument};
///
/// let document = WorkflowDocument::module(vec![
///     Step::bash("a", "echo hi"),
///     Step::bash("b", "echo bye"),
/// ]);
/// let graph = build(&document).unwrap();
/// assert_eq!(graph.nodes.len(), 4);
/// ```
pub fn build(document: &WorkflowDocument) -> Result<CompiledGraph, CompileError> {
    GraphBuilder::default().build(document)
}

/// Compiles documents into graphs. Holds only configuration; every call to
/// [`GraphBuilder::build`] starts from scratch.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    summary: SummaryOptions,
}

/// One top-level step or module, reduced to what chaining needs.
struct Entity<'a> {
    node: Node,
    decision: Option<&'a DecisionRule>,
    depends_on: &'a [String],
}

/// Accumulates nodes and edges, refusing duplicate edges.
#[derive(Default)]
struct Assembly {
    graph: CompiledGraph,
    seen: HashSet<(String, String, Option<String>)>,
}

impl Assembly {
    fn push_edge(&mut self, edge: Edge) {
        let key = (edge.source.clone(), edge.target.clone(), edge.label.clone());
        if self.seen.insert(key) {
            debug!("Edge {}", edge.id());
            self.graph.edges.push(edge);
        }
    }

    fn has_outgoing(&self, id: &str) -> bool {
        self.graph.edges.iter().any(|e| e.source == id)
    }
}

impl GraphBuilder {
    /// Compiles `document`, failing fast on the first structural error.
    ///
    /// No partial graph is ever returned.
    pub fn build(&self, document: &WorkflowDocument) -> Result<CompiledGraph, CompileError> {
        check_document(document)?;

        let entities = self.entities(document);
        let mut assembly = Assembly::default();

        assembly.graph.nodes.push(Node {
            id: START_ID.to_string(),
            kind: NodeKind::Start,
            summary_lines: Vec::new(),
            source: NodeSource::Start,
        });

        let mut entry = START_ID;
        if !document.triggers.is_empty() {
            assembly.graph.nodes.push(Node {
                id: TRIGGERS_ID.to_string(),
                kind: NodeKind::Trigger,
                summary_lines: triggers_summary(&document.triggers, &self.summary),
                source: NodeSource::Triggers(document.triggers.clone()),
            });
            assembly.push_edge(Edge::sequential(START_ID, TRIGGERS_ID));
            entry = TRIGGERS_ID;
        }

        for (index, entity) in entities.iter().enumerate() {
            let id = entity.node.id.as_str();

            if !entity.depends_on.is_empty() {
                for dependency in entity.depends_on {
                    assembly.push_edge(Edge::sequential(dependency.as_str(), id));
                }
            } else if index == 0 {
                assembly.push_edge(Edge::sequential(entry, id));
            } else {
                let previous = &entities[index - 1];
                if previous.decision.is_none() {
                    assembly.push_edge(Edge::sequential(previous.node.id.as_str(), id));
                }
            }

            if let Some(decision) = entity.decision {
                for edge in decision_edges(id, decision) {
                    assembly.push_edge(edge);
                }
            }
        }

        if !entities.is_empty() {
            for entity in &entities {
                if !assembly.has_outgoing(&entity.node.id) {
                    assembly.push_edge(Edge::sequential(entity.node.id.as_str(), END_ID));
                }
            }
        }

        let has_terminal = !entities.is_empty();
        assembly
            .graph
            .nodes
            .extend(entities.into_iter().map(|entity| entity.node));

        if has_terminal {
            assembly.graph.nodes.push(Node {
                id: END_ID.to_string(),
                kind: NodeKind::End,
                summary_lines: Vec::new(),
                source: NodeSource::End,
            });
        }

        let graph = assembly.graph;
        check_edges(&graph)?;

        info!(
            "Compiled graph: {} nodes, {} edges ({} branch)",
            graph.nodes.len(),
            graph.edges.len(),
            graph.edges.iter().filter(|e| e.branch).count()
        );

        Ok(graph)
    }

    fn entities<'a>(&self, document: &'a WorkflowDocument) -> Vec<Entity<'a>> {
        match document.kind {
            WorkflowKind::Module => document
                .steps
                .iter()
                .map(|step| {
                    if let StepBody::Unknown { type_name } = &step.body {
                        warn!(
                            "Step '{}' has unknown type '{}'; drawing it as a container",
                            step.name, type_name
                        );
                    }
                    Entity {
                        node: Node {
                            id: step.name.clone(),
                            kind: NodeKind::Step(StepKind::of(&step.body)),
                            summary_lines: step.summarize_with(&self.summary),
                            source: NodeSource::Step(step.clone()),
                        },
                        decision: step.decision.as_ref(),
                        depends_on: &[],
                    }
                })
                .collect(),
            WorkflowKind::Flow => document
                .modules
                .iter()
                .map(|module| Entity {
                    node: Node {
                        id: module.name.clone(),
                        kind: NodeKind::Module,
                        summary_lines: module.summarize_with(&self.summary),
                        source: NodeSource::Module(module.clone()),
                    },
                    decision: module.decision.as_ref(),
                    depends_on: &module.depends_on,
                })
                .collect(),
        }
    }
}

/// Branch edges for one decision rule, in declaration order.
///
/// Targets were resolved by validation, so unresolved cases are skipped.
fn decision_edges(owner: &str, decision: &DecisionRule) -> Vec<Edge> {
    match decision {
        DecisionRule::Conditions(cases) => cases
            .iter()
            .filter_map(|case| {
                case.target()
                    .map(|target| Edge::branch(owner, target, case.condition.as_str()))
            })
            .collect(),
        DecisionRule::Switch(rule) => {
            let mut edges: Vec<Edge> = rule
                .resolved_cases()
                .into_iter()
                .filter_map(|(label, target)| target.map(|t| Edge::branch(owner, t, label)))
                .collect();
            if let Some(target) = rule.default.as_ref().and_then(|d| d.resolve()) {
                edges.push(Edge::branch(owner, target, "default"));
            }
            edges
        }
    }
}

/// Every edge endpoint must be a node; the layout engine relies on it.
fn check_edges(graph: &CompiledGraph) -> Result<(), CompileError> {
    let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    for edge in &graph.edges {
        if !ids.contains(edge.source.as_str()) || !ids.contains(edge.target.as_str()) {
            return Err(CompileError::DanglingEdge {
                from: edge.source.clone(),
                to: edge.target.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::model::{DecisionCase, Module, Step, Trigger};
    use crate::workflow::parse_document;

    fn edge_pairs(graph: &CompiledGraph) -> Vec<(String, String, bool)> {
        graph
            .edges
            .iter()
            .map(|e| (e.source.clone(), e.target.clone(), e.branch))
            .collect()
    }

    fn pair(source: &str, target: &str, branch: bool) -> (String, String, bool) {
        (source.to_string(), target.to_string(), branch)
    }

    #[test]
    fn test_linear_module_chain() {
        let document = WorkflowDocument::module(vec![
            Step::bash("a", "echo hi"),
            Step::bash("b", "echo bye"),
        ]);
        let graph = build(&document).unwrap();

        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec![START_ID, "a", "b", END_ID]);
        assert_eq!(
            edge_pairs(&graph),
            vec![
                pair(START_ID, "a", false),
                pair("a", "b", false),
                pair("b", END_ID, false),
            ]
        );
        assert!(graph.edges.iter().all(|e| e.label.is_none()));
    }

    #[test]
    fn test_decision_suppresses_chaining() {
        let document = WorkflowDocument::module(vec![
            Step::bash("a", "echo a").with_decision(DecisionRule::Conditions(vec![
                DecisionCase::new("x==1", "b"),
                DecisionCase::new("x==2", "c"),
            ])),
            Step::bash("d", "echo d"),
            Step::bash("b", "echo b"),
            Step::bash("c", "echo c"),
        ]);
        let graph = build(&document).unwrap();

        let from_a: Vec<&Edge> = graph.outgoing("a").collect();
        assert_eq!(from_a.len(), 2);
        assert_eq!(from_a[0].target, "b");
        assert_eq!(from_a[0].label.as_deref(), Some("x==1"));
        assert!(from_a[0].branch);
        assert_eq!(from_a[1].target, "c");
        assert_eq!(from_a[1].label.as_deref(), Some("x==2"));
        assert!(!graph.edges.iter().any(|e| e.source == "a" && e.target == "d"));
    }

    #[test]
    fn test_switch_decision_edges() {
        let document = parse_document(
            r#"
steps:
  - name: route
    type: bash
    command: "true"
    decision:
      switch: "{{mode}}"
      cases:
        fast: { goto: quick }
        deep: { goto: full }
      default: { next: quick }
  - name: quick
    type: bash
    command: echo quick
  - name: full
    type: bash
    command: echo full
"#,
        )
        .unwrap();
        let graph = build(&document).unwrap();

        let labels: Vec<&str> = graph
            .outgoing("route")
            .map(|e| e.label.as_deref().unwrap_or(""))
            .collect();
        assert_eq!(labels, vec!["fast", "deep", "default"]);
        assert!(graph.outgoing("route").all(|e| e.branch));
    }

    #[test]
    fn test_duplicate_edges_are_collapsed() {
        let document = WorkflowDocument::module(vec![
            Step::bash("a", "echo a").with_decision(DecisionRule::Conditions(vec![
                DecisionCase::new("x", "b"),
                DecisionCase::new("x", "b"),
                DecisionCase::new("y", "b"),
            ])),
            Step::bash("b", "echo b"),
        ]);
        let graph = build(&document).unwrap();
        assert_eq!(graph.outgoing("a").count(), 2);
    }

    #[test]
    fn test_flow_depends_on_replaces_chaining() {
        let document = WorkflowDocument::flow(vec![
            Module::new("recon"),
            Module::new("ports"),
            Module::new("vuln").depends_on("recon").depends_on("ports"),
        ]);
        let graph = build(&document).unwrap();

        assert_eq!(
            edge_pairs(&graph),
            vec![
                pair(START_ID, "recon", false),
                pair("recon", "ports", false),
                pair("recon", "vuln", false),
                pair("ports", "vuln", false),
                pair("vuln", END_ID, false),
            ]
        );
    }

    #[test]
    fn test_depends_on_and_decision_coexist() {
        let document = WorkflowDocument::flow(vec![
            Module::new("a").with_decision(DecisionRule::Conditions(vec![DecisionCase::new(
                "ok", "c",
            )])),
            Module::new("b"),
            Module::new("c").depends_on("b"),
        ]);
        let graph = build(&document).unwrap();

        assert!(graph.edges.iter().any(|e| e.source == "a" && e.target == "c" && e.branch));
        assert!(graph.edges.iter().any(|e| e.source == "b" && e.target == "c" && !e.branch));
        assert!(!graph.edges.iter().any(|e| e.source == "a" && e.target == "b"));
    }

    #[test]
    fn test_triggers_become_one_node() {
        let document = WorkflowDocument::module(vec![Step::bash("a", "echo a")]).with_triggers(vec![
            Trigger::cron("nightly", "0 2 * * *"),
            Trigger::cron("weekly", "0 3 * * 0"),
        ]);
        let graph = build(&document).unwrap();

        let triggers: Vec<&Node> = graph
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Trigger)
            .collect();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].summary_lines, vec!["nightly (cron)", "weekly (cron)"]);
        assert!(graph.edges.contains(&Edge::sequential(TRIGGERS_ID, "a")));
        assert!(graph.edges.contains(&Edge::sequential(START_ID, TRIGGERS_ID)));
    }

    #[test]
    fn test_nested_steps_are_not_flattened() {
        let document = parse_document(
            r#"
steps:
  - name: fanout
    type: parallel-steps
    parallel_steps:
      - { name: x, type: bash, command: echo x }
      - { name: y, type: bash, command: echo y }
  - name: per-host
    type: foreach
    input: hosts.txt
    variable: host
    step: { name: scan, type: bash, command: nmap host }
"#,
        )
        .unwrap();
        let graph = build(&document).unwrap();

        assert_eq!(graph.nodes.len(), 4);
        assert!(!graph.contains("x"));
        assert!(!graph.contains("scan"));
        assert_eq!(graph.node("fanout").unwrap().kind.render_type(), "parallel");
    }

    #[test]
    fn test_duplicate_names_produce_no_graph() {
        let document = WorkflowDocument::module(vec![
            Step::bash("scan", "echo 1"),
            Step::bash("scan", "echo 2"),
        ]);
        let err = build(&document).unwrap_err();
        assert!(err.to_string().contains("scan"));
    }

    #[test]
    fn test_unknown_type_degrades_to_container() {
        let document = parse_document(
            r#"
steps:
  - { name: future, type: hologram, beam: true }
"#,
        )
        .unwrap();
        let graph = build(&document).unwrap();

        let node = graph.node("future").unwrap();
        assert_eq!(node.kind.render_type(), "container");
        assert!(node.summary_lines.is_empty());
    }

    #[test]
    fn test_empty_document_has_only_start() {
        let graph = build(&WorkflowDocument::default()).unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_completeness_and_edge_validity() {
        let document = WorkflowDocument::module(vec![
            Step::bash("a", "echo a").with_decision(DecisionRule::Conditions(vec![
                DecisionCase::new("loop", "a"),
                DecisionCase::new("done", "c"),
            ])),
            Step::bash("b", "echo b"),
            Step::bash("c", "echo c"),
        ])
        .with_triggers(vec![Trigger::cron("t", "* * * * *")]);
        let graph = build(&document).unwrap();

        let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids.len(), graph.nodes.len());
        for step in &document.steps {
            assert_eq!(graph.nodes.iter().filter(|n| n.id == step.name).count(), 1);
        }
        for edge in &graph.edges {
            assert!(ids.contains(edge.source.as_str()));
            assert!(ids.contains(edge.target.as_str()));
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let document = WorkflowDocument::flow(vec![
            Module::new("a").with_param("token", "t"),
            Module::new("b").depends_on("a"),
            Module::new("c").depends_on("a"),
        ]);
        assert_eq!(build(&document).unwrap(), build(&document).unwrap());
    }
}
