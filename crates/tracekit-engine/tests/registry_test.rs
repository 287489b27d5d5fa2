//! Node registry and container-reading mapping.

use tracekit_core::errors::{RegistryError, TraceErrorCode};
use tracekit_core::types::Node;
use tracekit_engine::{ContainerReading, MappingOptions, NodeRegistry, ReadingMatch};

fn registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry.register(Node::new("P1", "tank-1", 0).closed_at(10)).unwrap();
    registry.register(Node::new("P2", "tank-1", 10)).unwrap();
    registry.register(Node::new("P3", "tank-2", 5).closed_at(20)).unwrap();
    registry
}

#[test]
fn register_and_lookup() {
    let registry = registry();
    assert_eq!(registry.len(), 3);
    assert!(registry.contains("P2"));
    assert_eq!(registry.get("P3").unwrap().container_id, "tank-2");

    let err = registry.get("missing").unwrap_err();
    assert_eq!(err, RegistryError::unknown("missing"));
    assert_eq!(err.error_code(), "UNKNOWN_NODE");
}

#[test]
fn duplicate_id_is_rejected() {
    let mut registry = registry();
    let err = registry.register(Node::new("P1", "tank-9", 100)).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateNode { ref node_id } if node_id == "P1"));
    // The original record is kept.
    assert_eq!(registry.get("P1").unwrap().container_id, "tank-1");
}

#[test]
fn empty_interval_is_rejected() {
    let mut registry = NodeRegistry::new();
    let err = registry.register(Node::new("X", "tank-1", 5).closed_at(5)).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidInterval { start: 5, end: 5, .. }));
    assert!(registry.is_empty());
}

#[test]
fn batch_registration_reports_per_record() {
    let mut registry = NodeRegistry::new();
    let result = registry.register_all(vec![
        Node::new("A", "t", 0),
        Node::new("A", "t", 1),
        Node::new("B", "t", 3).closed_at(2),
        Node::new("C", "t", 4),
    ]);
    assert_eq!(result.data, 2);
    assert_eq!(result.error_count(), 2);
    assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["A", "C"]);
}

#[test]
fn validity_is_half_open() {
    let registry = registry();
    assert!(registry.validity_at("P1", 0).unwrap());
    assert!(registry.validity_at("P1", 9).unwrap());
    assert!(!registry.validity_at("P1", 10).unwrap());
    assert!(registry.validity_at("P2", 1_000_000).unwrap());
    assert!(registry.validity_at("nope", 0).is_err());
}

#[test]
fn active_at_lists_live_nodes() {
    let registry = registry();
    let ids: Vec<&str> = registry.active_at(10).iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["P2", "P3"]);
    assert!(registry.active_at(-1).is_empty());
}

#[test]
fn container_index() {
    let registry = registry();
    let mut ids: Vec<&str> = registry.in_container("tank-1").map(|n| n.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["P1", "P2"]);
    assert_eq!(registry.in_container("tank-404").count(), 0);
}

#[test]
fn readings_map_to_active_node() {
    let registry = registry();
    let readings = vec![
        ContainerReading::new("tank-1", 3),
        ContainerReading::new("tank-1", 10),
        ContainerReading::new("tank-2", 25),
    ];
    let matches = registry
        .map_container_readings(&readings, MappingOptions::default())
        .unwrap();
    assert_eq!(
        matches,
        vec![
            ReadingMatch { reading: 0, node_id: Some("P1".into()) },
            ReadingMatch { reading: 1, node_id: Some("P2".into()) },
            ReadingMatch { reading: 2, node_id: None },
        ]
    );
}

#[test]
fn unmatched_readings_can_be_dropped() {
    let registry = registry();
    let readings = vec![ContainerReading::new("tank-2", 25), ContainerReading::new("tank-2", 6)];
    let options = MappingOptions {
        include_unmatched: false,
        ..MappingOptions::default()
    };
    let matches = registry.map_container_readings(&readings, options).unwrap();
    assert_eq!(matches, vec![ReadingMatch { reading: 1, node_id: Some("P3".into()) }]);
}

#[test]
fn overlapping_nodes_in_one_container() {
    let mut registry = NodeRegistry::new();
    registry.register(Node::new("B", "tank", 0)).unwrap();
    registry.register(Node::new("A", "tank", 0)).unwrap();
    let readings = vec![ContainerReading::new("tank", 1)];

    let matches = registry
        .map_container_readings(&readings, MappingOptions::default())
        .unwrap();
    let ids: Vec<_> = matches.iter().map(|m| m.node_id.as_deref()).collect();
    assert_eq!(ids, vec![Some("A"), Some("B")]);

    let strict = MappingOptions {
        allow_multiple: false,
        ..MappingOptions::default()
    };
    let err = registry.map_container_readings(&readings, strict).unwrap_err();
    assert_eq!(err.error_code(), "AMBIGUOUS_MAPPING");
}

#[test]
fn reading_match_uses_segment_field_name() {
    let json = serde_json::to_value(ReadingMatch { reading: 0, node_id: Some("P1".into()) }).unwrap();
    assert_eq!(json["segment_id"], "P1");
}
