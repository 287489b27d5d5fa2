//! Property tests for share propagation and index maintenance.

use proptest::prelude::*;

use tracekit_core::config::TracekitConfig;
use tracekit_core::constants::SHARE_EPSILON;
use tracekit_core::traits::CancellationToken;
use tracekit_core::types::{Direction, Node, Transfer};
use tracekit_engine::graph::temporal;
use tracekit_engine::{IndexBuilder, TraceEngine, TraceabilityIndex};

fn node_id(i: usize) -> String {
    format!("n{i:02}")
}

/// Random transfers between `n` open-ended nodes. Endpoints and timestamps
/// are drawn independently, so self-loops, cycles and out-of-order arrivals
/// all show up and get rejected along the way.
fn transfer_strategy(n: usize) -> impl Strategy<Value = Vec<(usize, usize, u64, f64, i64)>> {
    prop::collection::vec((0..n, 0..n, 0u64..100, 0.0f64..50.0, 0i64..40), 0..n * 3)
}

fn load(
    config: TracekitConfig,
    n: usize,
    transfers: &[(usize, usize, u64, f64, i64)],
) -> TraceEngine {
    let engine = TraceEngine::new(config);
    engine.register_nodes((0..n).map(|i| Node::new(node_id(i), "pen", 0)));
    for &(s, d, count, biomass, t) in transfers {
        // Rejections are expected here.
        let _ = engine.append_transfer(Transfer::new(node_id(s), node_id(d), count, biomass, t));
    }
    engine
}

fn assert_close(a: &TraceabilityIndex, b: &TraceabilityIndex) -> Result<(), TestCaseError> {
    let rows_a: Vec<_> = a.rows().collect();
    let rows_b: Vec<_> = b.rows().collect();
    prop_assert_eq!(rows_a.len(), rows_b.len());
    for (x, y) in rows_a.iter().zip(&rows_b) {
        prop_assert_eq!(&x.origin_id, &y.origin_id);
        prop_assert_eq!(&x.traced_id, &y.traced_id);
        prop_assert_eq!(x.direction, y.direction);
        for (p, q) in x.factors.values().iter().zip(y.factors.values()) {
            prop_assert!((p - q).abs() < SHARE_EPSILON, "{:?} vs {:?}", x, y);
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn shares_are_bounded_and_identity_is_one(transfers in transfer_strategy(12)) {
        let engine = load(TracekitConfig::default(), 12, &transfers);
        let index = engine.build_index(&CancellationToken::new()).unwrap();

        for i in 0..12 {
            let id = node_id(i);
            let identity = index.get(&id, &id).unwrap();
            prop_assert_eq!(identity.factors.values(), [1.0; 4]);
        }
        for row in index.rows() {
            for share in row.factors.values() {
                prop_assert!((0.0..=1.0).contains(&share));
            }
            if row.direction != Direction::Identity {
                prop_assert_ne!(&row.origin_id, &row.traced_id);
            }
        }
    }

    #[test]
    fn forward_and_backward_entries_mirror_each_other(transfers in transfer_strategy(10)) {
        let engine = load(TracekitConfig::default(), 10, &transfers);
        let index = engine.build_index(&CancellationToken::new()).unwrap();

        for row in index.rows() {
            let mirror = index.get(&row.traced_id, &row.origin_id);
            match row.direction {
                Direction::Identity => {}
                Direction::Forward => {
                    prop_assert_eq!(mirror.map(|m| m.direction), Some(Direction::Backward));
                    prop_assert_eq!(row.factors.share_count_backward, 0.0);
                }
                Direction::Backward => {
                    prop_assert_eq!(mirror.map(|m| m.direction), Some(Direction::Forward));
                    prop_assert_eq!(row.factors.share_count_forward, 0.0);
                }
            }
        }
    }

    #[test]
    fn accepted_graph_is_a_time_ordered_dag(transfers in transfer_strategy(15)) {
        let engine = load(TracekitConfig::default(), 15, &transfers);
        let snapshot = engine.snapshot();
        prop_assert!(temporal::find_cycles(&snapshot.graph).is_empty());
        prop_assert!(temporal::find_time_violations(&snapshot.graph).is_empty());
        prop_assert_eq!(snapshot.ledger.len(), snapshot.graph.edge_count());
    }

    #[test]
    fn maintained_index_matches_full_rebuild(transfers in transfer_strategy(16)) {
        let engine = load(TracekitConfig::default(), 16, &[]);
        engine.build_index(&CancellationToken::new()).unwrap();
        for &(s, d, count, biomass, t) in &transfers {
            let _ = engine.append_transfer(Transfer::new(node_id(s), node_id(d), count, biomass, t));
        }
        prop_assert!(engine.is_index_current());
        let maintained = engine.index().unwrap();

        let snapshot = engine.snapshot();
        let rebuilt = IndexBuilder::default()
            .build(
                snapshot.version,
                &snapshot.registry,
                &snapshot.graph,
                &snapshot.stock,
                &CancellationToken::new(),
            )
            .unwrap();
        assert_close(&maintained, &rebuilt)?;
    }

    #[test]
    fn rebuild_is_deterministic(transfers in transfer_strategy(12)) {
        let engine = load(TracekitConfig::default(), 12, &transfers);
        let first = engine.build_index(&CancellationToken::new()).unwrap();
        let second = engine.build_index(&CancellationToken::new()).unwrap();
        prop_assert_eq!(&*first, &*second);
    }
}
