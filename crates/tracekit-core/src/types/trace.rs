//! Trace directions, aggregation kinds, share factors, and index rows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::SchemaError;
use crate::schema;

/// Relationship between the origin and the traced node of an index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The node traced to itself.
    Identity,
    /// Traced received material that flowed out of origin.
    Forward,
    /// Traced is an ancestor of origin.
    Backward,
}

impl Direction {
    pub const ALL: [Direction; 3] = [Direction::Identity, Direction::Forward, Direction::Backward];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => schema::direction::IDENTITY,
            Self::Forward => schema::direction::FORWARD,
            Self::Backward => schema::direction::BACKWARD,
        }
    }

    /// The direction of the mirror entry `(traced, origin)`.
    pub fn reversed(&self) -> Direction {
        match self {
            Self::Identity => Self::Identity,
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            schema::direction::IDENTITY => Ok(Self::Identity),
            schema::direction::FORWARD => Ok(Self::Forward),
            schema::direction::BACKWARD => Ok(Self::Backward),
            other => Err(SchemaError::UnknownValue {
                field: schema::traceability::TRACE_DIRECTION,
                value: other.to_string(),
            }),
        }
    }
}

/// Quantity a share is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateBy {
    /// Individuals.
    Count,
    /// Kilograms.
    Biomass,
}

impl AggregateBy {
    pub const ALL: [AggregateBy; 2] = [AggregateBy::Count, AggregateBy::Biomass];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Count => schema::aggregate_by::COUNT,
            Self::Biomass => schema::aggregate_by::BIOMASS,
        }
    }

    /// Position in `[count, biomass]` accumulator pairs.
    pub fn slot(&self) -> usize {
        match self {
            Self::Count => 0,
            Self::Biomass => 1,
        }
    }
}

impl fmt::Display for AggregateBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregateBy {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            schema::aggregate_by::COUNT => Ok(Self::Count),
            schema::aggregate_by::BIOMASS => Ok(Self::Biomass),
            other => Err(SchemaError::UnknownValue {
                field: "aggregate_by",
                value: other.to_string(),
            }),
        }
    }
}

/// The four share factors of an `(origin, traced)` pair, each in `[0, 1]`.
///
/// Forward factors: fraction of origin's outflow that ended up in traced.
/// Backward factors: fraction of origin's inflow that came from traced.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TraceFactors {
    pub share_count_forward: f64,
    pub share_biomass_forward: f64,
    pub share_count_backward: f64,
    pub share_biomass_backward: f64,
}

impl TraceFactors {
    pub const IDENTITY: TraceFactors = TraceFactors {
        share_count_forward: 1.0,
        share_biomass_forward: 1.0,
        share_count_backward: 1.0,
        share_biomass_backward: 1.0,
    };

    pub const ZERO: TraceFactors = TraceFactors {
        share_count_forward: 0.0,
        share_biomass_forward: 0.0,
        share_count_backward: 0.0,
        share_biomass_backward: 0.0,
    };

    /// Factors of a forward entry from `[count, biomass]` shares.
    pub fn forward(shares: [f64; 2]) -> Self {
        Self {
            share_count_forward: shares[0],
            share_biomass_forward: shares[1],
            ..Self::ZERO
        }
    }

    /// Factors of a backward entry from `[count, biomass]` shares.
    pub fn backward(shares: [f64; 2]) -> Self {
        Self {
            share_count_backward: shares[0],
            share_biomass_backward: shares[1],
            ..Self::ZERO
        }
    }

    /// Factors in `schema::factors::ALL` order.
    pub fn values(&self) -> [f64; 4] {
        [
            self.share_count_forward,
            self.share_biomass_forward,
            self.share_count_backward,
            self.share_biomass_backward,
        ]
    }

    pub fn forward_share(&self, by: AggregateBy) -> f64 {
        match by {
            AggregateBy::Count => self.share_count_forward,
            AggregateBy::Biomass => self.share_biomass_forward,
        }
    }

    pub fn backward_share(&self, by: AggregateBy) -> f64 {
        match by {
            AggregateBy::Count => self.share_count_backward,
            AggregateBy::Biomass => self.share_biomass_backward,
        }
    }

    /// The factor that applies to an entry of `direction`. Identity is 1.0.
    pub fn get(&self, direction: Direction, by: AggregateBy) -> f64 {
        match direction {
            Direction::Identity => 1.0,
            Direction::Forward => self.forward_share(by),
            Direction::Backward => self.backward_share(by),
        }
    }

    /// Largest of the four factors.
    pub fn max_value(&self) -> f64 {
        self.values().into_iter().fold(0.0, f64::max)
    }
}

/// Exported row of the traceability index, keyed by the schema field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRow {
    #[serde(rename = "origin_segment_id")]
    pub origin_id: String,
    #[serde(rename = "traced_segment_id")]
    pub traced_id: String,
    pub direction: Direction,
    #[serde(flatten)]
    pub factors: TraceFactors,
}
