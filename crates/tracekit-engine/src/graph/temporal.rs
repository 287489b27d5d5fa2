//! Time-ordered DAG enforcement, checked before every edge insertion.
//!
//! An edge `s -> d` at `t` is admissible when `d` does not already reach
//! `s`, every edge upstream of `s` is no later than `t`, and every edge
//! downstream of `d` is no earlier than `t`. The last condition keeps the
//! invariant true for edges that were inserted before this one.
//!
//! While the invariant holds, the latest edge anywhere upstream of a node is
//! one of its own incoming edges, and the earliest edge downstream is one of
//! its own outgoing edges, so insertion checks only look at direct edges.
//! The audits below walk the whole graph and work on any graph.

use std::collections::VecDeque;

use petgraph::algo::tarjan_scc;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{Dfs, EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use tracekit_core::errors::TemporalConflict;
use tracekit_core::types::collections::FxHashSet;
use tracekit_core::types::Timestamp;

use super::flow_graph::{FlowGraph, FlowStableGraph};

/// Check whether `source -> dest` at `timestamp` keeps the graph a time-ordered DAG.
pub fn check_insertion(
    graph: &FlowGraph,
    source: NodeIndex,
    dest: NodeIndex,
    timestamp: Timestamp,
) -> Result<(), TemporalConflict> {
    if source == dest || has_path(&graph.graph, dest, source) {
        return Err(TemporalConflict::StructuralCycle);
    }

    if let Some(upstream) = latest_arrival(&graph.graph, source) {
        if upstream > timestamp {
            return Err(TemporalConflict::ArrivalAfterDeparture {
                upstream_timestamp: upstream,
            });
        }
    }

    if let Some(downstream) = earliest_departure(&graph.graph, dest) {
        if downstream < timestamp {
            return Err(TemporalConflict::DepartureBeforeArrival {
                downstream_timestamp: downstream,
            });
        }
    }

    Ok(())
}

/// DFS reachability: can we reach `to` from `from`?
fn has_path(graph: &FlowStableGraph, from: NodeIndex, to: NodeIndex) -> bool {
    let mut dfs = Dfs::new(graph, from);
    while let Some(node) = dfs.next(graph) {
        if node == to {
            return true;
        }
    }
    false
}

/// Latest timestamp among the edges arriving at `node`.
fn latest_arrival(graph: &FlowStableGraph, node: NodeIndex) -> Option<Timestamp> {
    graph
        .edges_directed(node, Direction::Incoming)
        .map(|edge| edge.weight().timestamp)
        .max()
}

/// Earliest timestamp among the edges leaving `node`.
fn earliest_departure(graph: &FlowStableGraph, node: NodeIndex) -> Option<Timestamp> {
    graph
        .edges_directed(node, Direction::Outgoing)
        .map(|edge| edge.weight().timestamp)
        .min()
}

/// Latest timestamp of all edges upstream of `start` (`Incoming`), or the
/// earliest of all edges downstream of it (`Outgoing`).
fn extreme_timestamp(
    graph: &FlowGraph,
    start: NodeIndex,
    direction: Direction,
) -> Option<Timestamp> {
    let mut best: Option<Timestamp> = None;
    let mut visited = FxHashSet::default();
    visited.insert(start);
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        for edge in graph.graph.edges_directed(current, direction) {
            let t = edge.weight().timestamp;
            best = Some(match (best, direction) {
                (None, _) => t,
                (Some(b), Direction::Incoming) => b.max(t),
                (Some(b), Direction::Outgoing) => b.min(t),
            });
            let next = match direction {
                Direction::Incoming => edge.source(),
                Direction::Outgoing => edge.target(),
            };
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    best
}

/// Strongly-connected components with more than one node (cycles).
/// Empty for any graph built through `check_insertion`.
pub fn find_cycles(graph: &FlowGraph) -> Vec<Vec<NodeIndex>> {
    tarjan_scc(&graph.graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .collect()
}

/// Edges whose timestamp is earlier than some edge upstream of their source.
/// Empty for any graph built through `check_insertion`.
pub fn find_time_violations(graph: &FlowGraph) -> Vec<(NodeIndex, NodeIndex, Timestamp)> {
    let mut violations = Vec::new();
    for edge in graph.graph.edge_references() {
        let t = edge.weight().timestamp;
        if let Some(upstream) = extreme_timestamp(graph, edge.source(), Direction::Incoming) {
            if upstream > t {
                violations.push((edge.source(), edge.target(), t));
            }
        }
    }
    violations
}
