//! Arena view of one component: local indices, topological order, and
//! normalized edge weights for both directions.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracekit_core::types::collections::{FxHashMap, SmallVec4};
use tracekit_core::types::{Quantities, StockTable, Timestamp};

use crate::graph::FlowGraph;

/// Edge to a peer with `[count, biomass]` weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedEdge {
    pub peer: usize,
    pub weight: [f64; 2],
}

/// One weakly-connected component laid out for propagation.
///
/// `out_edges[u]` weights are fractions of `u`'s outflow;
/// `in_edges[v]` weights are fractions of `v`'s inflow. Parallel transfers
/// between the same pair are merged.
#[derive(Debug, Clone)]
pub struct ComponentView {
    pub ids: Vec<String>,
    pub local: FxHashMap<String, usize>,
    pub order: Vec<usize>,
    pub position: Vec<usize>,
    pub out_edges: Vec<SmallVec4<WeightedEdge>>,
    pub in_edges: Vec<SmallVec4<WeightedEdge>>,
}

impl ComponentView {
    pub fn build(graph: &FlowGraph, nodes: &[NodeIndex], stock: &StockTable) -> Self {
        let n = nodes.len();
        let mut ids = Vec::with_capacity(n);
        let mut starts: Vec<Timestamp> = Vec::with_capacity(n);
        let mut local: FxHashMap<String, usize> = FxHashMap::default();
        let mut to_local: FxHashMap<NodeIndex, usize> = FxHashMap::default();

        for (i, &idx) in nodes.iter().enumerate() {
            let node = &graph.graph[idx];
            ids.push(node.id.clone());
            starts.push(node.start_time);
            local.insert(node.id.clone(), i);
            to_local.insert(idx, i);
        }

        let mut raw: Vec<SmallVec4<(usize, Quantities)>> = vec![SmallVec4::new(); n];
        for (u, &idx) in nodes.iter().enumerate() {
            for edge in graph.graph.edges_directed(idx, Direction::Outgoing) {
                let Some(&v) = to_local.get(&edge.target()) else {
                    continue;
                };
                let q = edge.weight().quantities();
                match raw[u].iter_mut().find(|(peer, _)| *peer == v) {
                    Some((_, total)) => *total += q,
                    None => raw[u].push((v, q)),
                }
            }
        }

        let mut outflow = vec![Quantities::ZERO; n];
        let mut inflow = vec![Quantities::ZERO; n];
        for (u, edges) in raw.iter().enumerate() {
            for &(v, q) in edges {
                outflow[u] += q;
                inflow[v] += q;
            }
        }
        let out_denom: Vec<Quantities> = (0..n)
            .map(|u| stock.denominator(&ids[u], outflow[u]))
            .collect();
        let in_denom: Vec<Quantities> = (0..n)
            .map(|v| stock.denominator(&ids[v], inflow[v]))
            .collect();

        let mut out_edges: Vec<SmallVec4<WeightedEdge>> = vec![SmallVec4::new(); n];
        let mut in_edges: Vec<SmallVec4<WeightedEdge>> = vec![SmallVec4::new(); n];
        for (u, edges) in raw.iter().enumerate() {
            for &(v, q) in edges {
                out_edges[u].push(WeightedEdge {
                    peer: v,
                    weight: fractions(q, out_denom[u]),
                });
                in_edges[v].push(WeightedEdge {
                    peer: u,
                    weight: fractions(q, in_denom[v]),
                });
            }
        }

        let order = topological_order(&ids, &starts, &out_edges);
        let mut position = vec![0; n];
        for (pos, &u) in order.iter().enumerate() {
            position[u] = pos;
        }

        Self {
            ids,
            local,
            order,
            position,
            out_edges,
            in_edges,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// `q / denom` per quantity; a zero denominator yields zero.
fn fractions(q: Quantities, denom: Quantities) -> [f64; 2] {
    let ratio = |num: f64, den: f64| if den > 0.0 { num / den } else { 0.0 };
    [ratio(q.count, denom.count), ratio(q.biomass_kg, denom.biomass_kg)]
}

/// Kahn's algorithm; ready nodes are taken by `(start_time, id)`.
fn topological_order(
    ids: &[String],
    starts: &[Timestamp],
    out_edges: &[SmallVec4<WeightedEdge>],
) -> Vec<usize> {
    let n = ids.len();
    let mut indegree = vec![0usize; n];
    for edges in out_edges {
        for e in edges {
            indegree[e.peer] += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<(Timestamp, &str, usize)>> = (0..n)
        .filter(|&u| indegree[u] == 0)
        .map(|u| Reverse((starts[u], ids[u].as_str(), u)))
        .collect();

    let mut order = Vec::with_capacity(n);
    while let Some(Reverse((_, _, u))) = ready.pop() {
        order.push(u);
        for e in &out_edges[u] {
            indegree[e.peer] -= 1;
            if indegree[e.peer] == 0 {
                ready.push(Reverse((starts[e.peer], ids[e.peer].as_str(), e.peer)));
            }
        }
    }

    if order.len() < n {
        // Only reachable if the graph bypassed temporal checks.
        tracing::warn!(
            ordered = order.len(),
            total = n,
            "component is not acyclic; appending unordered nodes"
        );
        let mut placed = vec![false; n];
        for &u in &order {
            placed[u] = true;
        }
        order.extend((0..n).filter(|&u| !placed[u]));
    }

    order
}
