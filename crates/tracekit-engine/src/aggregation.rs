//! Caller-side aggregation of per-node values over an origin's index entries.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracekit_core::errors::IndexError;
use tracekit_core::types::collections::{FxHashMap, FxHashSet};
use tracekit_core::types::{AggregateBy, Direction, Timestamp};

use crate::index::{IndexEntry, TraceabilityIndex};

/// Values attached to nodes (e.g. mortality, feed, a measurement).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeValues {
    values: FxHashMap<String, f64>,
}

impl NodeValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node_id: impl Into<String>, value: f64) {
        self.values.insert(node_id.into(), value);
    }

    pub fn get(&self, node_id: &str) -> Option<f64> {
        self.values.get(node_id).copied()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for NodeValues {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Reduction applied to the values of an origin's traced nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Aggregation {
    Sum,
    Avg,
    Min,
    Max,
    /// Scale each value by the fraction of the traced node attributable to
    /// the origin, then sum. The weight comes from the mirror entry: for a
    /// forward row `(O, T)` the fraction of T's inflow that came from O,
    /// for a backward row `(O, A)` the fraction of A's outflow that went to O.
    WeightedSum { by: AggregateBy },
    /// Average weighted by each row's own factor; identity weighs 1.0.
    WeightedAvg { by: AggregateBy },
    Concat { separator: String, unique: bool },
    /// `traced<field_separator>share` per row joined by `row_separator`.
    /// Needs no values.
    ContributionBreakdown {
        by: AggregateBy,
        field_separator: String,
        row_separator: String,
    },
}

impl Aggregation {
    pub fn contribution_breakdown(by: AggregateBy) -> Self {
        Self::ContributionBreakdown {
            by,
            field_separator: ":".to_string(),
            row_separator: ", ".to_string(),
        }
    }
}

/// Result of one aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AggregateValue {
    Number(f64),
    Text(String),
    /// No row contributed (or all weights were zero).
    Empty,
}

impl AggregateValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for AggregateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Empty => Ok(()),
        }
    }
}

/// Aggregate `values` over the entries of `origin_id`.
///
/// `directions` filters the entries used; an empty slice keeps all. Rows
/// whose traced node has no value are skipped.
pub fn aggregate(
    index: &TraceabilityIndex,
    origin_id: &str,
    values: &NodeValues,
    aggregation: &Aggregation,
    directions: &[Direction],
) -> Result<AggregateValue, IndexError> {
    let entries = index
        .entries(origin_id)
        .ok_or_else(|| IndexError::UnknownOrigin {
            node_id: origin_id.to_string(),
        })?;
    let selected: Vec<&IndexEntry> = entries
        .iter()
        .filter(|e| directions.is_empty() || directions.contains(&e.direction))
        .collect();

    if let Aggregation::ContributionBreakdown {
        by,
        field_separator,
        row_separator,
    } = aggregation
    {
        let parts: Vec<String> = selected
            .iter()
            .map(|e| {
                format!(
                    "{}{}{}",
                    e.traced_id,
                    field_separator,
                    e.factors.get(e.direction, *by)
                )
            })
            .collect();
        return Ok(AggregateValue::Text(parts.join(row_separator)));
    }

    let rows: Vec<(&IndexEntry, f64)> = selected
        .into_iter()
        .filter_map(|e| values.get(&e.traced_id).map(|v| (e, v)))
        .collect();

    let value = match aggregation {
        Aggregation::Sum => AggregateValue::Number(rows.iter().map(|(_, v)| v).sum()),
        Aggregation::Avg => {
            if rows.is_empty() {
                AggregateValue::Empty
            } else {
                let sum: f64 = rows.iter().map(|(_, v)| v).sum();
                AggregateValue::Number(sum / rows.len() as f64)
            }
        }
        Aggregation::Min => extreme(&rows, f64::min),
        Aggregation::Max => extreme(&rows, f64::max),
        Aggregation::WeightedSum { by } => {
            let total: f64 = rows
                .iter()
                .map(|(e, v)| v * complementary_weight(index, origin_id, e, *by))
                .sum();
            AggregateValue::Number(total)
        }
        Aggregation::WeightedAvg { by } => {
            let (mut sum_vw, mut sum_w) = (0.0, 0.0);
            for (e, v) in &rows {
                let w = e.factors.get(e.direction, *by);
                sum_vw += v * w;
                sum_w += w;
            }
            if sum_w > 0.0 {
                AggregateValue::Number(sum_vw / sum_w)
            } else {
                AggregateValue::Empty
            }
        }
        Aggregation::Concat { separator, unique } => {
            let mut seen = FxHashSet::default();
            let parts: Vec<String> = rows
                .iter()
                .map(|(_, v)| v.to_string())
                .filter(|s| !*unique || seen.insert(s.clone()))
                .collect();
            AggregateValue::Text(parts.join(separator))
        }
        Aggregation::ContributionBreakdown { .. } => AggregateValue::Empty,
    };
    Ok(value)
}

/// Aggregate a time series of values, one result per timestamp.
pub fn aggregate_series(
    index: &TraceabilityIndex,
    origin_id: &str,
    series: &BTreeMap<Timestamp, NodeValues>,
    aggregation: &Aggregation,
    directions: &[Direction],
) -> Result<Vec<(Timestamp, AggregateValue)>, IndexError> {
    series
        .iter()
        .map(|(&t, values)| Ok((t, aggregate(index, origin_id, values, aggregation, directions)?)))
        .collect()
}

fn extreme(rows: &[(&IndexEntry, f64)], pick: fn(f64, f64) -> f64) -> AggregateValue {
    rows.iter()
        .map(|(_, v)| *v)
        .reduce(pick)
        .map_or(AggregateValue::Empty, AggregateValue::Number)
}

fn complementary_weight(
    index: &TraceabilityIndex,
    origin_id: &str,
    entry: &IndexEntry,
    by: AggregateBy,
) -> f64 {
    match entry.direction {
        Direction::Identity => 1.0,
        Direction::Forward => index
            .get(&entry.traced_id, origin_id)
            .map_or(0.0, |mirror| mirror.factors.backward_share(by)),
        Direction::Backward => index
            .get(&entry.traced_id, origin_id)
            .map_or(0.0, |mirror| mirror.factors.forward_share(by)),
    }
}
