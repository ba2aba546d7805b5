//! Layered Layout
//!
//! Hierarchical (Sugiyama-style) layout in five phases:
//! 1. Cycle breaking: DFS in node order, back edges are reversed
//! 2. Ranking: longest path from the sources
//! 3. Ordering: barycenter sweeps, keeping the order with fewest crossings
//! 4. Coordinates: ranks centred on the widest one, then shifted to
//!    top-left anchors
//! 5. Fallback: nodes without any edge go in one extra rank after the last
//!
//! Every phase iterates in node-list order, so identical input always
//! yields identical positions.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};

use log::{debug, warn};

use super::{LayoutEngine, Orientation, Position, PositionedNode, Spacing, SpacingConfig};
use crate::graph::node::{Edge, Node};

/// Barycenter sweeps (one down plus one up each).
const SWEEPS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Done,
}

/// The default [`LayoutEngine`].
#[derive(Debug, Clone)]
pub struct LayeredLayout {
    spacing: SpacingConfig,
}

impl Default for LayeredLayout {
    fn default() -> Self {
        Self::new(SpacingConfig::default())
    }
}

impl LayeredLayout {
    pub fn new(spacing: SpacingConfig) -> Self {
        Self { spacing }
    }
}

impl LayoutEngine for LayeredLayout {
    fn layout(&self, nodes: &[Node], edges: &[Edge], orientation: Orientation) -> Vec<PositionedNode> {
        let spacing = self.spacing.spacing_for(edges);
        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), i))
            .collect();

        let links = rank_links(edges, &index);
        let mut connected = vec![false; nodes.len()];
        for &(u, v) in &links {
            connected[u] = true;
            connected[v] = true;
        }

        let dag = break_cycles(nodes.len(), &links, &connected);
        let ranks = assign_ranks(nodes.len(), &dag, &connected);
        let mut layers = build_layers(&ranks);
        let crossings = order_layers(&mut layers, &dag, &ranks);

        debug!(
            "Layout: {} ranks, {} crossings, node_sep {}, rank_sep {}",
            layers.len(),
            crossings,
            spacing.node_sep,
            spacing.rank_sep
        );

        let centers = self.centers(nodes.len(), &layers, &connected, spacing, orientation);
        let (width, height) = (self.spacing.node_width, self.spacing.node_height);

        nodes
            .iter()
            .zip(centers)
            .map(|(node, (cx, cy))| PositionedNode {
                node: node.clone(),
                position: Position {
                    x: cx - width / 2.0,
                    y: cy - height / 2.0,
                },
            })
            .collect()
    }
}

impl LayeredLayout {
    /// Center point of every node, in node order.
    fn centers(
        &self,
        count: usize,
        layers: &[Vec<usize>],
        connected: &[bool],
        spacing: Spacing,
        orientation: Orientation,
    ) -> Vec<(f64, f64)> {
        // Extent of one node along the rank and across ranks
        let (along, across) = match orientation {
            Orientation::TopToBottom => (self.spacing.node_width, self.spacing.node_height),
            Orientation::LeftToRight => (self.spacing.node_height, self.spacing.node_width),
        };
        let span = |n: usize| {
            if n == 0 {
                0.0
            } else {
                n as f64 * along + (n - 1) as f64 * spacing.node_sep
            }
        };
        let widest = layers.iter().map(|layer| span(layer.len())).fold(0.0, f64::max);

        let mut centers = vec![(0.0, 0.0); count];
        let mut place = |node: usize, rank: usize, slot: usize, offset: f64| {
            let a = offset + slot as f64 * (along + spacing.node_sep) + along / 2.0;
            let c = rank as f64 * (across + spacing.rank_sep) + across / 2.0;
            centers[node] = match orientation {
                Orientation::TopToBottom => (a, c),
                Orientation::LeftToRight => (c, a),
            };
        };

        for (rank, layer) in layers.iter().enumerate() {
            let offset = (widest - span(layer.len())) / 2.0;
            for (slot, &node) in layer.iter().enumerate() {
                place(node, rank, slot, offset);
            }
        }

        let fallback_rank = layers.len();
        let isolated: Vec<usize> = (0..count).filter(|&i| !connected[i]).collect();
        if !isolated.is_empty() && !layers.is_empty() {
            debug!("{} nodes without edges placed in rank {}", isolated.len(), fallback_rank);
        }
        for (slot, node) in isolated.into_iter().enumerate() {
            place(node, fallback_rank, slot, 0.0);
        }

        centers
    }
}

/// Edge endpoints as node indices, without self loops or repeats.
fn rank_links(edges: &[Edge], index: &HashMap<&str, usize>) -> Vec<(usize, usize)> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for edge in edges {
        let (Some(&u), Some(&v)) = (index.get(edge.source.as_str()), index.get(edge.target.as_str()))
        else {
            warn!("Layout ignores edge {} with an unknown endpoint", edge.id());
            continue;
        };
        if u != v && seen.insert((u, v)) {
            links.push((u, v));
        }
    }

    links
}

/// Returns an acyclic link set: back edges found by DFS are reversed.
fn break_cycles(count: usize, links: &[(usize, usize)], connected: &[bool]) -> Vec<(usize, usize)> {
    let mut out: Vec<Vec<usize>> = vec![Vec::new(); count];
    for &(u, v) in links {
        out[u].push(v);
    }

    let mut state = vec![Visit::New; count];
    let mut dag = Vec::with_capacity(links.len());
    for root in 0..count {
        if connected[root] && state[root] == Visit::New {
            visit(root, &out, &mut state, &mut dag);
        }
    }

    let mut seen = HashSet::new();
    dag.retain(|link| seen.insert(*link));
    dag
}

fn visit(node: usize, out: &[Vec<usize>], state: &mut [Visit], dag: &mut Vec<(usize, usize)>) {
    state[node] = Visit::Active;
    for &next in &out[node] {
        match state[next] {
            Visit::New => {
                dag.push((node, next));
                visit(next, out, state, dag);
            }
            Visit::Active => dag.push((next, node)),
            Visit::Done => dag.push((node, next)),
        }
    }
    state[node] = Visit::Done;
}

/// Longest-path rank per connected node; `None` for nodes without edges.
fn assign_ranks(count: usize, dag: &[(usize, usize)], connected: &[bool]) -> Vec<Option<usize>> {
    let mut out: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut in_degree = vec![0usize; count];
    for &(u, v) in dag {
        out[u].push(v);
        in_degree[v] += 1;
    }

    let mut ranks: Vec<Option<usize>> = vec![None; count];
    let mut queue: VecDeque<usize> = (0..count)
        .filter(|&i| connected[i] && in_degree[i] == 0)
        .collect();
    for &root in &queue {
        ranks[root] = Some(0);
    }

    while let Some(node) = queue.pop_front() {
        let rank = ranks[node].unwrap_or(0);
        for &next in &out[node] {
            let candidate = rank + 1;
            if ranks[next].map_or(true, |r| r < candidate) {
                ranks[next] = Some(candidate);
            }
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    ranks
}

fn build_layers(ranks: &[Option<usize>]) -> Vec<Vec<usize>> {
    let depth = ranks.iter().flatten().max().map_or(0, |r| r + 1);
    let mut layers = vec![Vec::new(); depth];
    for (node, rank) in ranks.iter().enumerate() {
        if let Some(rank) = rank {
            layers[*rank].push(node);
        }
    }
    layers
}

/// Reorders every layer to reduce crossings and returns the final count.
fn order_layers(
    layers: &mut Vec<Vec<usize>>,
    dag: &[(usize, usize)],
    ranks: &[Option<usize>],
) -> usize {
    let count = ranks.len();
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut succs: Vec<Vec<usize>> = vec![Vec::new(); count];
    for &(u, v) in dag {
        succs[u].push(v);
        preds[v].push(u);
    }

    let mut best = layers.clone();
    let mut best_crossings = total_crossings(layers, dag, ranks);

    for _ in 0..SWEEPS {
        if best_crossings == 0 {
            break;
        }

        for rank in 1..layers.len() {
            let positions = slot_positions(layers, count);
            reorder(&mut layers[rank], &preds, &positions);
        }
        for rank in (0..layers.len().saturating_sub(1)).rev() {
            let positions = slot_positions(layers, count);
            reorder(&mut layers[rank], &succs, &positions);
        }

        let crossings = total_crossings(layers, dag, ranks);
        if crossings < best_crossings {
            best_crossings = crossings;
            best = layers.clone();
        }
    }

    *layers = best;
    best_crossings
}

fn slot_positions(layers: &[Vec<usize>], count: usize) -> Vec<usize> {
    let mut positions = vec![0; count];
    for layer in layers {
        for (slot, &node) in layer.iter().enumerate() {
            positions[node] = slot;
        }
    }
    positions
}

/// Sorts a layer by the mean slot of each node's neighbours.
///
/// Nodes without neighbours keep their current slot as key; ties keep the
/// current order.
fn reorder(layer: &mut Vec<usize>, neighbours: &[Vec<usize>], positions: &[usize]) {
    let mut keyed: Vec<(f64, usize, usize)> = layer
        .iter()
        .enumerate()
        .map(|(slot, &node)| {
            let around = &neighbours[node];
            let key = if around.is_empty() {
                slot as f64
            } else {
                around.iter().map(|&n| positions[n] as f64).sum::<f64>() / around.len() as f64
            };
            (key, slot, node)
        })
        .collect();

    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal).then(a.1.cmp(&b.1)));
    *layer = keyed.into_iter().map(|(_, _, node)| node).collect();
}

/// Crossings between all pairs of adjacent ranks.
fn total_crossings(layers: &[Vec<usize>], dag: &[(usize, usize)], ranks: &[Option<usize>]) -> usize {
    let positions = slot_positions(layers, ranks.len());
    let mut by_rank: HashMap<usize, Vec<(usize, usize)>> = HashMap::new();

    for &(u, v) in dag {
        if let (Some(ru), Some(rv)) = (ranks[u], ranks[v]) {
            if rv == ru + 1 {
                by_rank.entry(ru).or_default().push((positions[u], positions[v]));
            }
        }
    }

    by_rank.values().map(|segments| count_crossings(segments)).sum()
}

/// Counts pairwise crossings among segments between two adjacent ranks.
pub fn count_crossings(segments: &[(usize, usize)]) -> usize {
    let mut crossings = 0;
    for (i, &(a_top, a_bottom)) in segments.iter().enumerate() {
        for &(b_top, b_bottom) in &segments[i + 1..] {
            if (a_top < b_top && a_bottom > b_bottom) || (a_top > b_top && a_bottom < b_bottom) {
                crossings += 1;
            }
        }
    }
    crossings
}
