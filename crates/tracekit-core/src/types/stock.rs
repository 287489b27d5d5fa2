//! Quantities and caller-supplied total stock per node.

use serde::{Deserialize, Serialize};

use super::collections::FxHashMap;
use super::trace::AggregateBy;

/// A pair of quantities: individuals and kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quantities {
    pub count: f64,
    pub biomass_kg: f64,
}

impl Quantities {
    pub const ZERO: Quantities = Quantities {
        count: 0.0,
        biomass_kg: 0.0,
    };

    pub fn new(count: f64, biomass_kg: f64) -> Self {
        Self { count, biomass_kg }
    }

    pub fn get(&self, by: AggregateBy) -> f64 {
        match by {
            AggregateBy::Count => self.count,
            AggregateBy::Biomass => self.biomass_kg,
        }
    }

    /// Component-wise maximum.
    pub fn max(self, other: Quantities) -> Quantities {
        Quantities {
            count: self.count.max(other.count),
            biomass_kg: self.biomass_kg.max(other.biomass_kg),
        }
    }
}

impl std::ops::AddAssign for Quantities {
    fn add_assign(&mut self, rhs: Self) {
        self.count += rhs.count;
        self.biomass_kg += rhs.biomass_kg;
    }
}

/// Total stock supplied by the caller for nodes that hold material which
/// never appears as an outgoing transfer (or that received from outside the
/// ledger). Used as the normalization denominator in place of the flow sum
/// when larger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockTable {
    entries: FxHashMap<String, Quantities>,
}

impl StockTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, node_id: impl Into<String>, stock: Quantities) {
        self.entries.insert(node_id.into(), stock);
    }

    pub fn get(&self, node_id: &str) -> Option<Quantities> {
        self.entries.get(node_id).copied()
    }

    pub fn remove(&mut self, node_id: &str) -> Option<Quantities> {
        self.entries.remove(node_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normalization denominator for a node whose transfers sum to `flow`.
    pub fn denominator(&self, node_id: &str, flow: Quantities) -> Quantities {
        match self.get(node_id) {
            Some(stock) => flow.max(stock),
            None => flow,
        }
    }
}
