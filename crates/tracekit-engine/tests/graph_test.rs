//! Flow graph construction and time-ordered DAG enforcement.

use petgraph::Direction;
use tracekit_core::errors::{GraphError, TemporalConflict, TraceError, TraceErrorCode};
use tracekit_core::types::{Node, Quantities, Transfer, TransferId};
use tracekit_engine::graph::temporal;
use tracekit_engine::graph::FlowEdge;
use tracekit_engine::{FlowGraph, FlowGraphBuilder, NodeRegistry, TransferLedger};

fn registry(ids: &[&str]) -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    for id in ids {
        registry.register(Node::new(*id, format!("tank-{id}"), 0)).unwrap();
    }
    registry
}

fn ledger(registry: &NodeRegistry, transfers: Vec<Transfer>) -> TransferLedger {
    let mut ledger = TransferLedger::default();
    let result = ledger.append_all(registry, transfers);
    assert!(result.is_clean());
    ledger
}

fn conflict(err: TraceError) -> TemporalConflict {
    match err {
        TraceError::Graph(GraphError::TemporalCycle { conflict, .. }) => conflict,
        other => panic!("expected temporal cycle, got {other}"),
    }
}

#[test]
fn builds_multigraph_with_every_node() {
    let registry = registry(&["A", "B", "C", "D"]);
    let ledger = ledger(
        &registry,
        vec![
            Transfer::new("A", "B", 60, 6.0, 10),
            Transfer::new("A", "B", 40, 4.0, 12),
            Transfer::new("B", "C", 100, 10.0, 20),
        ],
    );
    let result = FlowGraphBuilder::new().build(&registry, &ledger);
    assert!(result.is_clean());
    let graph = result.data;

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 3);

    let a = graph.get_node("A").unwrap();
    let b = graph.get_node("B").unwrap();
    assert_eq!(graph.flow(a, Direction::Outgoing), Quantities::new(100.0, 10.0));
    assert_eq!(graph.flow(b, Direction::Incoming), Quantities::new(100.0, 10.0));
    assert_eq!(graph.node_id(a), Some("A"));

    let c = graph.get_node("C").unwrap();
    let d = graph.get_node("D").unwrap();
    assert!(graph.descendants(a).contains(&c));
    assert!(graph.ancestors(c).contains(&a));
    assert!(!graph.descendants(c).contains(&a));
    assert_eq!(graph.component_of(d), vec![d]);
    assert_eq!(graph.component_of(c), vec![a, b, c]);
}

#[test]
fn reverse_edge_is_a_structural_cycle() {
    let registry = registry(&["A", "B"]);
    let builder = FlowGraphBuilder::new();
    let mut graph = builder.build(&registry, &TransferLedger::default()).data;

    builder.extend(&mut graph, TransferId(0), &Transfer::new("A", "B", 1, 1.0, 10)).unwrap();
    let err = builder
        .extend(&mut graph, TransferId(1), &Transfer::new("B", "A", 1, 1.0, 20))
        .unwrap_err();
    assert_eq!(err.error_code(), "TEMPORAL_CYCLE");
    assert_eq!(conflict(err), TemporalConflict::StructuralCycle);
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn onward_transfer_cannot_predate_arrival() {
    let registry = registry(&["A", "B", "C"]);
    let builder = FlowGraphBuilder::new();
    let mut graph = builder.build(&registry, &TransferLedger::default()).data;

    builder.extend(&mut graph, TransferId(0), &Transfer::new("A", "B", 1, 1.0, 20)).unwrap();
    let err = builder
        .extend(&mut graph, TransferId(1), &Transfer::new("B", "C", 1, 1.0, 10))
        .unwrap_err();
    assert_eq!(
        conflict(err),
        TemporalConflict::ArrivalAfterDeparture {
            upstream_timestamp: 20
        }
    );
}

#[test]
fn late_arrival_cannot_follow_departure() {
    let registry = registry(&["A", "B", "C"]);
    let builder = FlowGraphBuilder::new();
    let mut graph = builder.build(&registry, &TransferLedger::default()).data;

    builder.extend(&mut graph, TransferId(0), &Transfer::new("B", "C", 1, 1.0, 10)).unwrap();
    let err = builder
        .extend(&mut graph, TransferId(1), &Transfer::new("A", "B", 1, 1.0, 20))
        .unwrap_err();
    assert_eq!(
        conflict(err),
        TemporalConflict::DepartureBeforeArrival {
            downstream_timestamp: 10
        }
    );
}

#[test]
fn equal_timestamps_are_consistent() {
    let registry = registry(&["A", "B", "C"]);
    let builder = FlowGraphBuilder::new();
    let mut graph = builder.build(&registry, &TransferLedger::default()).data;
    builder.extend(&mut graph, TransferId(0), &Transfer::new("A", "B", 1, 1.0, 10)).unwrap();
    builder.extend(&mut graph, TransferId(1), &Transfer::new("B", "C", 1, 1.0, 10)).unwrap();
    assert_eq!(graph.edge_count(), 2);
}

#[test]
fn build_reports_inconsistent_transfers_and_keeps_the_rest() {
    let registry = registry(&["A", "B", "C"]);
    // Both pass the ledger; inserted chronologically, the later A -> B
    // would arrive after B already shipped onward.
    let ledger = ledger(
        &registry,
        vec![
            Transfer::new("A", "B", 1, 1.0, 20),
            Transfer::new("B", "C", 1, 1.0, 10),
        ],
    );
    let result = FlowGraphBuilder::new().build(&registry, &ledger);
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.data.edge_count(), 1);
    assert_eq!(
        conflict(result.errors.into_iter().next().unwrap()),
        TemporalConflict::DepartureBeforeArrival {
            downstream_timestamp: 10
        }
    );
}

#[test]
fn conflicts_are_found_at_the_ends_of_long_chains() {
    let mut ids: Vec<String> = (0..=20).map(|i| format!("n{i:02}")).collect();
    ids.push("x".to_string());
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let registry = registry(&id_refs);
    let builder = FlowGraphBuilder::new();
    let mut graph = builder.build(&registry, &TransferLedger::default()).data;

    for i in 0..20u64 {
        let transfer = Transfer::new(
            format!("n{i:02}"),
            format!("n{:02}", i + 1),
            1,
            1.0,
            10 * (i as i64 + 1),
        );
        builder.extend(&mut graph, TransferId(i), &transfer).unwrap();
    }
    assert!(temporal::find_time_violations(&graph).is_empty());

    let err = builder.check(&graph, &Transfer::new("n20", "x", 1, 1.0, 15)).unwrap_err();
    assert_eq!(
        conflict(err),
        TemporalConflict::ArrivalAfterDeparture {
            upstream_timestamp: 200
        }
    );

    let err = builder.check(&graph, &Transfer::new("x", "n00", 1, 1.0, 500)).unwrap_err();
    assert_eq!(
        conflict(err),
        TemporalConflict::DepartureBeforeArrival {
            downstream_timestamp: 10
        }
    );

    builder.check(&graph, &Transfer::new("n20", "x", 1, 1.0, 200)).unwrap();
}

#[test]
fn check_does_not_mutate() {
    let registry = registry(&["A", "B"]);
    let builder = FlowGraphBuilder::new();
    let graph = builder.build(&registry, &TransferLedger::default()).data;
    builder.check(&graph, &Transfer::new("A", "B", 1, 1.0, 5)).unwrap();
    assert_eq!(graph.edge_count(), 0);

    let err = builder.check(&graph, &Transfer::new("A", "Z", 1, 1.0, 5)).unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_NODE");
}

#[test]
fn audits_flag_graphs_that_bypassed_checks() {
    let mut graph = FlowGraph::new();
    let a = graph.ensure_node(&Node::new("A", "t", 0));
    let b = graph.ensure_node(&Node::new("B", "t", 0));
    let c = graph.ensure_node(&Node::new("C", "t", 0));
    let edge = |id: u64, t| FlowEdge {
        transfer_id: TransferId(id),
        count: 1.0,
        biomass_kg: 1.0,
        timestamp: t,
    };

    graph.graph.add_edge(a, b, edge(0, 20));
    graph.graph.add_edge(b, c, edge(1, 10));
    assert!(temporal::find_cycles(&graph).is_empty());
    assert_eq!(temporal::find_time_violations(&graph), vec![(b, c, 10)]);

    graph.graph.add_edge(c, a, edge(2, 30));
    let cycles = temporal::find_cycles(&graph);
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].len(), 3);
}

#[test]
fn ensure_node_is_idempotent() {
    let mut graph = FlowGraph::new();
    let first = graph.ensure_node(&Node::new("A", "t", 0));
    let second = graph.ensure_node(&Node::new("A", "t", 0));
    assert_eq!(first, second);
    assert_eq!(graph.node_count(), 1);
}
