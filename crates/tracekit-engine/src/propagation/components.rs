//! Weakly-connected components of the flow graph.

use petgraph::stable_graph::NodeIndex;
use petgraph::unionfind::UnionFind;
use petgraph::visit::{EdgeRef, IntoEdgeReferences, NodeIndexable};

use crate::graph::FlowGraph;

/// Partition the graph into weakly-connected components.
///
/// Each component lists its nodes by index; components are ordered by their
/// smallest node id so results are independent of hash iteration order.
pub fn weakly_connected(graph: &FlowGraph) -> Vec<Vec<NodeIndex>> {
    let bound = graph.graph.node_bound();
    let mut sets = UnionFind::<usize>::new(bound);
    for edge in graph.graph.edge_references() {
        sets.union(edge.source().index(), edge.target().index());
    }

    let mut groups: Vec<Vec<NodeIndex>> = vec![Vec::new(); bound];
    for idx in graph.graph.node_indices() {
        groups[sets.find(idx.index())].push(idx);
    }

    let mut components: Vec<Vec<NodeIndex>> =
        groups.into_iter().filter(|g| !g.is_empty()).collect();
    for component in &mut components {
        component.sort_by(|a, b| graph.node_id(*a).cmp(&graph.node_id(*b)));
    }
    components.sort_by(|a, b| graph.node_id(a[0]).cmp(&graph.node_id(b[0])));
    components
}
