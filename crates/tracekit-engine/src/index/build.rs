//! Full index builds.

use std::time::Instant;

use tracekit_core::config::TracekitConfig;
use tracekit_core::errors::IndexError;
use tracekit_core::tracing::metrics;
use tracekit_core::traits::Cancellable;
use tracekit_core::types::StockTable;

use super::{FactorScope, TraceabilityIndex};
use crate::graph::FlowGraph;
use crate::propagation::Propagator;
use crate::registry::NodeRegistry;

/// Builds and incrementally maintains traceability indexes.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    pub(crate) propagator: Propagator,
    pub(crate) scope: FactorScope,
    pub(crate) min_share: f64,
    pub(crate) full_rebuild_ratio: f64,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new(&TracekitConfig::default())
    }
}

impl IndexBuilder {
    pub fn new(config: &TracekitConfig) -> Self {
        Self {
            propagator: Propagator::new(&config.propagation),
            scope: FactorScope::All,
            min_share: config.propagation.effective_min_share(),
            full_rebuild_ratio: config.index.effective_full_rebuild_ratio(),
        }
    }

    /// Restrict which quantities are computed.
    pub fn with_scope(mut self, scope: FactorScope) -> Self {
        self.scope = scope;
        self
    }

    /// Build the whole index from scratch. This is the correctness baseline
    /// incremental updates are measured against.
    ///
    /// Every registered node gets an identity entry, including nodes the
    /// graph does not know.
    pub fn build(
        &self,
        version: u64,
        registry: &NodeRegistry,
        graph: &FlowGraph,
        stock: &StockTable,
        token: &(dyn Cancellable + Sync),
    ) -> Result<TraceabilityIndex, IndexError> {
        let start = Instant::now();
        let shares = self.propagator.propagate_all(graph, stock, token)?;

        let mut index = TraceabilityIndex::new(version, self.scope, self.min_share);
        for origin in &shares {
            if !registry.contains(&origin.origin_id) {
                continue;
            }
            let entries = index.entries_from(origin);
            index.replace_origin(&origin.origin_id, entries);
        }
        for node_id in registry.ids() {
            index.insert_identity(node_id);
        }

        tracing::info!(
            { metrics::INDEX_BUILD_TIME } = start.elapsed().as_millis() as u64,
            { metrics::ORIGINS_TRACED } = index.origin_count(),
            { metrics::ENTRIES_WRITTEN } = index.len(),
            { metrics::SNAPSHOT_VERSION } = version,
            "traceability index built"
        );
        Ok(index)
    }
}
