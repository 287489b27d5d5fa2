//! Transfers of individuals and biomass between nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::Timestamp;

/// Ledger-assigned identifier; monotonically increasing in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransferId(pub u64);

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A discrete movement of count and biomass from one node to another.
///
/// Immutable once ingested; corrections are new compensating transfers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    #[serde(rename = "source_pop_id")]
    pub source_id: String,
    #[serde(rename = "dest_pop_id")]
    pub dest_id: String,
    #[serde(rename = "transfer_count")]
    pub count: u64,
    #[serde(rename = "transfer_biomass_kg")]
    pub biomass_kg: f64,
    #[serde(rename = "transfer_time")]
    pub timestamp: Timestamp,
}

impl Transfer {
    pub fn new(
        source_id: impl Into<String>,
        dest_id: impl Into<String>,
        count: u64,
        biomass_kg: f64,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            dest_id: dest_id.into(),
            count,
            biomass_kg,
            timestamp,
        }
    }

    /// Zero count and zero biomass: moves nothing.
    pub fn is_noop(&self) -> bool {
        self.count == 0 && self.biomass_kg == 0.0
    }
}
