//! Aggregating node values over index entries.

use std::collections::BTreeMap;

use tracekit_core::errors::IndexError;
use tracekit_core::traits::CancellationToken;
use tracekit_core::types::{AggregateBy, Direction, Node, Transfer};
use tracekit_engine::aggregation::{aggregate, aggregate_series};
use tracekit_engine::{AggregateValue, Aggregation, NodeValues, TraceEngine, TraceabilityIndex};

/// S1 and S2 feed M (30 and 10 fish); M ships everything to F.
fn index() -> std::sync::Arc<TraceabilityIndex> {
    let engine = TraceEngine::default();
    for id in ["S1", "S2", "M", "F"] {
        engine.register_node(Node::new(id, format!("c-{id}"), 0)).unwrap();
    }
    let batch = engine.append_transfers(vec![
        Transfer::new("S1", "M", 30, 3.0, 10),
        Transfer::new("S2", "M", 10, 3.0, 10),
        Transfer::new("M", "F", 40, 6.0, 20),
    ]);
    assert!(batch.is_clean());
    engine.build_index(&CancellationToken::new()).unwrap()
}

fn values() -> NodeValues {
    [("S1", 2.0), ("S2", 6.0), ("M", 1.0)].into_iter().collect()
}

fn number(value: AggregateValue) -> f64 {
    value.as_f64().unwrap_or_else(|| panic!("not a number: {value:?}"))
}

#[test]
fn plain_reductions_over_backward_entries() {
    let index = index();
    let values = values();
    let backward = [Direction::Backward];

    let sum = aggregate(&index, "F", &values, &Aggregation::Sum, &backward).unwrap();
    assert_eq!(number(sum), 9.0);
    let avg = aggregate(&index, "F", &values, &Aggregation::Avg, &backward).unwrap();
    assert_eq!(number(avg), 3.0);
    let min = aggregate(&index, "F", &values, &Aggregation::Min, &backward).unwrap();
    assert_eq!(number(min), 1.0);
    let max = aggregate(&index, "F", &values, &Aggregation::Max, &backward).unwrap();
    assert_eq!(number(max), 6.0);
}

#[test]
fn all_directions_when_none_selected() {
    let index = index();
    let values = values();
    // Identity M plus backward S1, S2; forward F has no value.
    let sum = aggregate(&index, "M", &values, &Aggregation::Sum, &[]).unwrap();
    assert_eq!(number(sum), 9.0);
}

#[test]
fn weighted_average_uses_row_factors() {
    let index = index();
    let values = values();
    let by_count = aggregate(
        &index,
        "M",
        &values,
        &Aggregation::WeightedAvg { by: AggregateBy::Count },
        &[Direction::Backward],
    )
    .unwrap();
    // 0.75 * 2 + 0.25 * 6
    assert_eq!(number(by_count), 3.0);

    let by_biomass = aggregate(
        &index,
        "M",
        &values,
        &Aggregation::WeightedAvg { by: AggregateBy::Biomass },
        &[Direction::Backward],
    )
    .unwrap();
    assert_eq!(number(by_biomass), 4.0);
}

#[test]
fn weighted_sum_uses_the_mirror_share() {
    let index = index();
    // How much of each source's stock ended up in F.
    let values: NodeValues = [("F", 100.0)].into_iter().collect();
    let from_s1 = aggregate(
        &index,
        "S1",
        &values,
        &Aggregation::WeightedSum { by: AggregateBy::Count },
        &[Direction::Forward],
    )
    .unwrap();
    // S1 is 75% of F's inflow by count.
    assert_eq!(number(from_s1), 75.0);
}

#[test]
fn concat_and_breakdown() {
    let index = index();
    let values: NodeValues = [("S1", 1.0), ("S2", 1.0), ("M", 2.0)].into_iter().collect();

    let joined = aggregate(
        &index,
        "F",
        &values,
        &Aggregation::Concat {
            separator: "|".into(),
            unique: false,
        },
        &[Direction::Backward],
    )
    .unwrap();
    assert_eq!(joined, AggregateValue::Text("2|1|1".into()));

    let unique = aggregate(
        &index,
        "F",
        &values,
        &Aggregation::Concat {
            separator: "|".into(),
            unique: true,
        },
        &[Direction::Backward],
    )
    .unwrap();
    assert_eq!(unique.to_string(), "2|1");

    let breakdown = aggregate(
        &index,
        "M",
        &NodeValues::new(),
        &Aggregation::contribution_breakdown(AggregateBy::Count),
        &[Direction::Backward],
    )
    .unwrap();
    assert_eq!(breakdown.to_string(), "S1:0.75, S2:0.25");
}

#[test]
fn empty_selections() {
    let index = index();
    let none = NodeValues::new();
    assert_eq!(
        aggregate(&index, "F", &none, &Aggregation::Avg, &[]).unwrap(),
        AggregateValue::Empty
    );
    assert_eq!(
        number(aggregate(&index, "F", &none, &Aggregation::Sum, &[]).unwrap()),
        0.0
    );
    assert!(matches!(
        aggregate(&index, "nope", &none, &Aggregation::Sum, &[]),
        Err(IndexError::UnknownOrigin { .. })
    ));
}

#[test]
fn series_aggregates_per_timestamp() {
    let index = index();
    let mut series = BTreeMap::new();
    series.insert(1, [("S1", 1.0), ("S2", 1.0)].into_iter().collect::<NodeValues>());
    series.insert(2, [("S1", 4.0)].into_iter().collect::<NodeValues>());

    let out = aggregate_series(&index, "M", &series, &Aggregation::Sum, &[Direction::Backward]).unwrap();
    assert_eq!(
        out,
        vec![(1, AggregateValue::Number(2.0)), (2, AggregateValue::Number(4.0))]
    );
}

#[test]
fn aggregation_kinds_deserialize_from_tagged_json() {
    let parsed: Aggregation =
        serde_json::from_str(r#"{"kind":"weighted_avg","by":"biomass"}"#).unwrap();
    assert_eq!(parsed, Aggregation::WeightedAvg { by: AggregateBy::Biomass });
}
