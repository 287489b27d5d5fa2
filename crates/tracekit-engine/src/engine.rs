//! TraceEngine: versioned ledger snapshots, a single writer, and an
//! atomically published traceability index.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracekit_core::config::TracekitConfig;
use tracekit_core::errors::{BatchResult, IndexError, TraceError};
use tracekit_core::tracing::metrics;
use tracekit_core::traits::{CancellationToken, IndexSink, RecordSource};
use tracekit_core::types::{
    IndexRow, Node, Quantities, StockTable, TimeWindow, Timestamp, Transfer, TransferId,
};

use crate::export;
use crate::graph::{FlowGraph, FlowGraphBuilder};
use crate::index::{IndexBuilder, TraceabilityIndex, UpdateOutcome};
use crate::ledger::{Admission, TransferLedger};
use crate::registry::NodeRegistry;

/// Immutable view of all inputs at one version.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    pub version: u64,
    pub registry: NodeRegistry,
    pub ledger: TransferLedger,
    pub graph: FlowGraph,
    pub stock: StockTable,
}

impl LedgerSnapshot {
    fn empty(config: &TracekitConfig) -> Self {
        Self {
            version: 0,
            registry: NodeRegistry::new(),
            ledger: TransferLedger::new(&config.ledger),
            graph: FlowGraph::new(),
            stock: StockTable::new(),
        }
    }

    pub fn active_at(&self, time: Timestamp) -> Vec<&Node> {
        self.registry.active_at(time)
    }

    pub fn nodes_without_inflow(&self) -> Vec<&Node> {
        self.ledger.nodes_without_inflow(&self.registry)
    }

    pub fn nodes_without_outflow(&self) -> Vec<&Node> {
        self.ledger.nodes_without_outflow(&self.registry)
    }
}

/// Counts from [`TraceEngine::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub nodes: usize,
    pub transfers: usize,
}

/// Entry point for ingesting records and querying traceability.
///
/// Writers are serialized; each write builds the next snapshot from a copy
/// and swaps it in, so readers holding an `Arc<LedgerSnapshot>` never see a
/// partial append. Index builds publish by swapping an `Arc` as well.
pub struct TraceEngine {
    config: TracekitConfig,
    builder: IndexBuilder,
    graph_builder: FlowGraphBuilder,
    snapshot: RwLock<Arc<LedgerSnapshot>>,
    index: RwLock<Option<Arc<TraceabilityIndex>>>,
    writer: Mutex<()>,
}

impl Default for TraceEngine {
    fn default() -> Self {
        Self::new(TracekitConfig::default())
    }
}

impl TraceEngine {
    pub fn new(config: TracekitConfig) -> Self {
        Self {
            builder: IndexBuilder::new(&config),
            graph_builder: FlowGraphBuilder::new(),
            snapshot: RwLock::new(Arc::new(LedgerSnapshot::empty(&config))),
            index: RwLock::new(None),
            writer: Mutex::new(()),
            config,
        }
    }

    pub fn config(&self) -> &TracekitConfig {
        &self.config
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<LedgerSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The published index; `IndexError::NotBuilt` before the first build.
    pub fn index(&self) -> Result<Arc<TraceabilityIndex>, IndexError> {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(IndexError::NotBuilt)
    }

    /// Whether the published index reflects the current snapshot.
    pub fn is_index_current(&self) -> bool {
        match self.index() {
            Ok(index) => index.version() == self.snapshot().version,
            Err(_) => false,
        }
    }

    // --- Writes ---

    pub fn register_node(&self, node: Node) -> Result<(), TraceError> {
        let mut batch = self.register_nodes([node]);
        match batch.errors.pop() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Register nodes; duplicates and empty intervals are reported per record.
    pub fn register_nodes(&self, nodes: impl IntoIterator<Item = Node>) -> BatchResult<usize> {
        let _writer = self.lock_writer();
        let current = self.snapshot();
        let mut next = (*current).clone();

        let mut added: Vec<String> = Vec::new();
        let mut result = BatchResult::new(0);
        for node in nodes {
            let id = node.id.clone();
            match next.registry.register(node) {
                Ok(()) => {
                    if let Ok(node) = next.registry.get(&id) {
                        next.graph.ensure_node(node);
                    }
                    added.push(id);
                    result.data += 1;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "node rejected");
                    result.add_error(e);
                }
            }
        }
        if added.is_empty() {
            return result;
        }

        next.version += 1;
        let version = next.version;
        self.publish_snapshot(next);

        if self.config.index.effective_incremental() {
            self.update_index(|index| {
                for id in &added {
                    index.insert_identity(id);
                }
                index.set_version(version);
                Ok(())
            });
        }
        result
    }

    /// Append one transfer. `Ok(None)` when it was ignored as a no-op.
    ///
    /// A `TemporalCycleError` rejects only this transfer; the snapshot and
    /// index are left untouched.
    pub fn append_transfer(&self, transfer: Transfer) -> Result<Option<TransferId>, TraceError> {
        let _writer = self.lock_writer();
        let current = self.snapshot();

        if current.ledger.check(&current.registry, &transfer)? == Admission::Ignore {
            return Ok(None);
        }
        self.graph_builder.check(&current.graph, &transfer)?;

        let mut next = (*current).clone();
        let id = self.commit(&mut next, transfer.clone())?;
        next.version += 1;
        let next = self.publish_snapshot(next);

        self.refresh_index(&next, &[(&transfer.source_id, &transfer.dest_id)]);
        Ok(Some(id))
    }

    /// Append many transfers in chronological order (stable for ties).
    /// Offending records are skipped and reported. Ids and errors come back
    /// in that chronological order, not the input order.
    pub fn append_transfers(
        &self,
        transfers: impl IntoIterator<Item = Transfer>,
    ) -> BatchResult<Vec<TransferId>> {
        let _writer = self.lock_writer();
        let current = self.snapshot();
        let mut next = (*current).clone();

        let mut transfers: Vec<Transfer> = transfers.into_iter().collect();
        transfers.sort_by_key(|t| t.timestamp);

        let mut result = BatchResult::new(Vec::new());
        let mut changes: Vec<(String, String)> = Vec::new();
        for transfer in transfers {
            match next.ledger.check(&next.registry, &transfer) {
                Ok(Admission::Accept) => {}
                Ok(Admission::Ignore) => continue,
                Err(e) => {
                    tracing::debug!(error = %e, "transfer rejected");
                    result.add_error(e);
                    continue;
                }
            }
            let endpoints = (transfer.source_id.clone(), transfer.dest_id.clone());
            match self.commit(&mut next, transfer) {
                Ok(id) => {
                    result.data.push(id);
                    changes.push(endpoints);
                }
                Err(e) => {
                    tracing::debug!(error = %e, "transfer rejected by flow graph");
                    result.add_error(e);
                }
            }
        }

        tracing::info!(
            accepted = result.data.len(),
            { metrics::RECORDS_REJECTED } = result.error_count(),
            "transfer batch appended"
        );
        if changes.is_empty() {
            return result;
        }

        next.version += 1;
        let next = self.publish_snapshot(next);
        let changes: Vec<(&str, &str)> = changes
            .iter()
            .map(|(s, d)| (s.as_str(), d.as_str()))
            .collect();
        self.refresh_index(&next, &changes);
        result
    }

    /// Set the total stock used as normalization denominator for `node_id`.
    pub fn set_stock(&self, node_id: &str, stock: Quantities) -> Result<(), TraceError> {
        let _writer = self.lock_writer();
        let current = self.snapshot();
        current.registry.get(node_id)?;

        let mut next = (*current).clone();
        next.stock.set(node_id, stock);
        next.version += 1;
        let next = self.publish_snapshot(next);

        self.refresh_index(&next, &[(node_id, node_id)]);
        Ok(())
    }

    /// Ingest all records of `source`: nodes first, then transfers.
    pub fn load(&self, source: &dyn RecordSource) -> BatchResult<LoadSummary> {
        let mut result = BatchResult::new(LoadSummary::default());
        let nodes = self.register_nodes(source.nodes());
        result.data.nodes = result.absorb(nodes);
        let transfers = self.append_transfers(source.transfers());
        result.data.transfers = result.absorb(transfers).len();
        tracing::info!(
            nodes = result.data.nodes,
            transfers = result.data.transfers,
            { metrics::RECORDS_REJECTED } = result.error_count(),
            "records loaded"
        );
        result
    }

    // --- Index ---

    /// Build the index from the current snapshot and publish it.
    ///
    /// Writers wait for the build. On cancellation nothing is published and
    /// the previous index stays in place.
    pub fn build_index(
        &self,
        token: &CancellationToken,
    ) -> Result<Arc<TraceabilityIndex>, TraceError> {
        let _writer = self.lock_writer();
        let snapshot = self.snapshot();
        let index = Arc::new(self.builder.build(
            snapshot.version,
            &snapshot.registry,
            &snapshot.graph,
            &snapshot.stock,
            token,
        )?);
        *self.index.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&index));
        Ok(index)
    }

    /// Rows with `origin_id` as origin.
    pub fn query_origin(&self, origin_id: &str) -> Result<Vec<IndexRow>, TraceError> {
        let index = self.index()?;
        let rows = index.query_origin(origin_id)?.collect();
        Ok(rows)
    }

    /// Rows with `traced_id` as traced node.
    pub fn query_traced(&self, traced_id: &str) -> Result<Vec<IndexRow>, TraceError> {
        let index = self.index()?;
        let rows = index.query_traced(traced_id).collect();
        Ok(rows)
    }

    /// Rows of `origin_id` whose traced node was active during `window`.
    ///
    /// Shares are computed over whole lifetimes; the window only filters.
    pub fn query_origin_in_window(
        &self,
        origin_id: &str,
        window: TimeWindow,
    ) -> Result<Vec<IndexRow>, TraceError> {
        let index = self.index()?;
        let snapshot = self.snapshot();
        let rows = index
            .query_origin(origin_id)?
            .filter(|row| {
                snapshot
                    .registry
                    .get(&row.traced_id)
                    .map(|node| node.overlaps(&window))
                    .unwrap_or(false)
            })
            .collect();
        Ok(rows)
    }

    /// Write the published index to `sink`. Returns the row count.
    pub fn publish_to(&self, sink: &dyn IndexSink) -> Result<usize, TraceError> {
        let index = self.index()?;
        Ok(export::export_index(&index, sink)?)
    }

    // --- Internals ---

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_snapshot(&self, next: LedgerSnapshot) -> Arc<LedgerSnapshot> {
        let next = Arc::new(next);
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&next);
        next
    }

    /// Insert into the graph (temporal check) and then the ledger.
    fn commit(
        &self,
        next: &mut LedgerSnapshot,
        transfer: Transfer,
    ) -> Result<TransferId, TraceError> {
        let id = TransferId(next.ledger.len() as u64);
        self.graph_builder.extend(&mut next.graph, id, &transfer)?;
        Ok(next.ledger.commit(transfer))
    }

    /// Bring the published index up to `snapshot` after the given edge changes.
    fn refresh_index(&self, snapshot: &LedgerSnapshot, changes: &[(&str, &str)]) {
        if !self.config.index.effective_incremental() {
            return;
        }
        let token = CancellationToken::new();
        self.update_index(|index| {
            self.builder
                .rebuild_affected_many(
                    index,
                    snapshot.version,
                    &snapshot.registry,
                    &snapshot.graph,
                    &snapshot.stock,
                    changes,
                    &token,
                )
                .map(|outcome| {
                    if outcome == UpdateOutcome::FullRebuild {
                        tracing::info!(version = snapshot.version, "index fully rebuilt on update");
                    }
                })
        });
    }

    /// Apply `update` to a copy of the published index and swap it in.
    /// No-op before the first build. On failure the old index stays.
    fn update_index(&self, update: impl FnOnce(&mut TraceabilityIndex) -> Result<(), IndexError>) {
        let Ok(current) = self.index() else {
            return;
        };
        let mut next = (*current).clone();
        match update(&mut next) {
            Ok(()) => {
                *self.index.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(next));
            }
            Err(e) => {
                tracing::warn!(error = %e, "incremental index update failed; index is stale");
            }
        }
    }
}
