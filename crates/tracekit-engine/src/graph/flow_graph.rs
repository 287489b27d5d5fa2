//! petgraph::StableGraph wrapper with FlowNode and FlowEdge types.

use std::collections::VecDeque;

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::{Directed, Direction};
use serde::{Deserialize, Serialize};
use tracekit_core::types::collections::{FxHashMap, FxHashSet};
use tracekit_core::types::{Node, Quantities, Timestamp, Transfer, TransferId};

/// A vertex of the flow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    pub start_time: Timestamp,
}

/// An accepted transfer. Parallel edges between the same pair are kept.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlowEdge {
    pub transfer_id: TransferId,
    pub count: f64,
    pub biomass_kg: f64,
    pub timestamp: Timestamp,
}

impl FlowEdge {
    pub fn from_transfer(transfer_id: TransferId, transfer: &Transfer) -> Self {
        Self {
            transfer_id,
            count: transfer.count as f64,
            biomass_kg: transfer.biomass_kg,
            timestamp: transfer.timestamp,
        }
    }

    pub fn quantities(&self) -> Quantities {
        Quantities::new(self.count, self.biomass_kg)
    }
}

pub type FlowStableGraph = StableGraph<FlowNode, FlowEdge, Directed>;

/// Directed multigraph with O(1) lookup by node id.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    pub graph: FlowStableGraph,
    pub node_index: FxHashMap<String, NodeIndex>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the vertex for `node`.
    pub fn ensure_node(&mut self, node: &Node) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(&node.id) {
            return idx;
        }
        let idx = self.graph.add_node(FlowNode {
            id: node.id.clone(),
            start_time: node.start_time,
        });
        self.node_index.insert(node.id.clone(), idx);
        idx
    }

    pub fn get_node(&self, node_id: &str) -> Option<NodeIndex> {
        self.node_index.get(node_id).copied()
    }

    pub fn node_id(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(|n| n.id.as_str())
    }

    /// Insert an edge without temporal checks.
    pub(crate) fn add_edge_unchecked(
        &mut self,
        source: NodeIndex,
        dest: NodeIndex,
        edge: FlowEdge,
    ) {
        self.graph.add_edge(source, dest, edge);
    }

    /// Sum of quantities on edges in `direction` from `idx`.
    pub fn flow(&self, idx: NodeIndex, direction: Direction) -> Quantities {
        let mut total = Quantities::ZERO;
        for edge in self.graph.edges_directed(idx, direction) {
            total += edge.weight().quantities();
        }
        total
    }

    /// Every node reachable from `start` following `direction`, excluding `start`.
    pub fn reachable(&self, start: NodeIndex, direction: Direction) -> FxHashSet<NodeIndex> {
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for neighbor in self.graph.neighbors_directed(current, direction) {
                if neighbor != start && visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        visited
    }

    pub fn ancestors(&self, idx: NodeIndex) -> FxHashSet<NodeIndex> {
        self.reachable(idx, Direction::Incoming)
    }

    pub fn descendants(&self, idx: NodeIndex) -> FxHashSet<NodeIndex> {
        self.reachable(idx, Direction::Outgoing)
    }

    /// Nodes weakly connected to `start`, including `start`, ordered by id.
    pub fn component_of(&self, start: NodeIndex) -> Vec<NodeIndex> {
        let mut visited = FxHashSet::default();
        visited.insert(start);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for neighbor in self.graph.neighbors_undirected(current) {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        let mut nodes: Vec<NodeIndex> = visited.into_iter().collect();
        nodes.sort_by(|a, b| self.node_id(*a).cmp(&self.node_id(*b)));
        nodes
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
