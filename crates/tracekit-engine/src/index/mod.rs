//! Traceability index: materialized `(origin, traced, direction, factors)` entries.

pub mod build;
pub mod incremental;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracekit_core::errors::IndexError;
use tracekit_core::types::{AggregateBy, Direction, IndexRow, TraceFactors};

use crate::propagation::OriginShares;

pub use build::IndexBuilder;
pub use incremental::UpdateOutcome;

/// Which quantities an index build computes. Uncomputed factors are 0.0;
/// identity entries are always 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorScope {
    #[default]
    All,
    Count,
    Biomass,
}

impl FactorScope {
    pub fn includes(&self, by: AggregateBy) -> bool {
        match self {
            Self::All => true,
            Self::Count => by == AggregateBy::Count,
            Self::Biomass => by == AggregateBy::Biomass,
        }
    }

    fn mask(&self, shares: [f64; 2]) -> [f64; 2] {
        let mut masked = [0.0; 2];
        for by in AggregateBy::ALL {
            if self.includes(by) {
                masked[by.slot()] = shares[by.slot()];
            }
        }
        masked
    }
}

impl From<AggregateBy> for FactorScope {
    fn from(by: AggregateBy) -> Self {
        match by {
            AggregateBy::Count => Self::Count,
            AggregateBy::Biomass => Self::Biomass,
        }
    }
}

/// One entry under an origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub traced_id: String,
    pub direction: Direction,
    pub factors: TraceFactors,
}

impl IndexEntry {
    pub fn identity(node_id: impl Into<String>) -> Self {
        Self {
            traced_id: node_id.into(),
            direction: Direction::Identity,
            factors: TraceFactors::IDENTITY,
        }
    }

    pub fn to_row(&self, origin_id: &str) -> IndexRow {
        IndexRow {
            origin_id: origin_id.to_string(),
            traced_id: self.traced_id.clone(),
            direction: self.direction,
            factors: self.factors,
        }
    }
}

/// Materialized traceability index.
///
/// Entries under each origin are ordered identity first, then forward, then
/// backward, each group by traced id. A traced node appears at most once per
/// origin: in a DAG it cannot be both upstream and downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceabilityIndex {
    version: u64,
    scope: FactorScope,
    min_share: f64,
    by_origin: BTreeMap<String, Vec<IndexEntry>>,
    by_traced: BTreeMap<String, BTreeSet<String>>,
}

impl TraceabilityIndex {
    pub(crate) fn new(version: u64, scope: FactorScope, min_share: f64) -> Self {
        Self {
            version,
            scope,
            min_share,
            by_origin: BTreeMap::new(),
            by_traced: BTreeMap::new(),
        }
    }

    /// Ledger snapshot version this index reflects.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    pub fn scope(&self) -> FactorScope {
        self.scope
    }

    pub fn min_share(&self) -> f64 {
        self.min_share
    }

    /// Entries for `shares.origin_id`, identity included, pruned by `min_share`.
    pub(crate) fn entries_from(&self, shares: &OriginShares) -> Vec<IndexEntry> {
        let mut entries = Vec::with_capacity(1 + shares.forward.len() + shares.backward.len());
        entries.push(IndexEntry::identity(shares.origin_id.as_str()));

        let directional = shares
            .forward
            .iter()
            .map(|(id, s)| (id, Direction::Forward, TraceFactors::forward(self.scope.mask(*s))))
            .chain(shares.backward.iter().map(|(id, s)| {
                (id, Direction::Backward, TraceFactors::backward(self.scope.mask(*s)))
            }));

        for (traced_id, direction, factors) in directional {
            if factors.max_value() < self.min_share {
                continue;
            }
            entries.push(IndexEntry {
                traced_id: traced_id.clone(),
                direction,
                factors,
            });
        }
        entries
    }

    /// Replace every entry of `origin_id`.
    pub(crate) fn replace_origin(&mut self, origin_id: &str, entries: Vec<IndexEntry>) {
        if let Some(old) = self.by_origin.remove(origin_id) {
            for entry in old {
                if let Some(origins) = self.by_traced.get_mut(&entry.traced_id) {
                    origins.remove(origin_id);
                    if origins.is_empty() {
                        self.by_traced.remove(&entry.traced_id);
                    }
                }
            }
        }
        for entry in &entries {
            self.by_traced
                .entry(entry.traced_id.clone())
                .or_default()
                .insert(origin_id.to_string());
        }
        self.by_origin.insert(origin_id.to_string(), entries);
    }

    /// Add the identity entry for a node with no transfers yet.
    pub(crate) fn insert_identity(&mut self, node_id: &str) {
        if !self.by_origin.contains_key(node_id) {
            self.replace_origin(node_id, vec![IndexEntry::identity(node_id)]);
        }
    }

    /// Entries recorded for `origin_id`.
    pub fn entries(&self, origin_id: &str) -> Option<&[IndexEntry]> {
        self.by_origin.get(origin_id).map(Vec::as_slice)
    }

    /// The entry for the pair `(origin_id, traced_id)`, if any.
    pub fn get(&self, origin_id: &str, traced_id: &str) -> Option<&IndexEntry> {
        let entries = self.by_origin.get(origin_id)?;
        Direction::ALL.iter().find_map(|&direction| {
            entries
                .binary_search_by(|e| {
                    (e.direction, e.traced_id.as_str()).cmp(&(direction, traced_id))
                })
                .ok()
                .map(|i| &entries[i])
        })
    }

    /// Rows with `origin_id` as origin.
    pub fn query_origin<'a>(
        &'a self,
        origin_id: &'a str,
    ) -> Result<impl Iterator<Item = IndexRow> + 'a, IndexError> {
        let entries = self
            .by_origin
            .get(origin_id)
            .ok_or_else(|| IndexError::UnknownOrigin {
                node_id: origin_id.to_string(),
            })?;
        Ok(entries.iter().map(move |e| e.to_row(origin_id)))
    }

    /// Rows with `traced_id` as traced node, ordered by origin id.
    /// Empty for a node the index has never seen.
    pub fn query_traced<'a>(&'a self, traced_id: &'a str) -> impl Iterator<Item = IndexRow> + 'a {
        self.by_traced
            .get(traced_id)
            .into_iter()
            .flatten()
            .filter_map(move |origin| self.get(origin, traced_id).map(|e| e.to_row(origin)))
    }

    /// All rows ordered by origin id.
    pub fn rows(&self) -> impl Iterator<Item = IndexRow> + '_ {
        self.by_origin
            .iter()
            .flat_map(|(origin, entries)| entries.iter().map(move |e| e.to_row(origin)))
    }

    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.by_origin.keys().map(String::as_str)
    }

    pub fn origin_count(&self) -> usize {
        self.by_origin.len()
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.by_origin.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_origin.is_empty()
    }
}
