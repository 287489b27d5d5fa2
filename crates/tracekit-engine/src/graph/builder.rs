//! Flow graph construction from a registry and ledger.

use std::time::Instant;

use tracekit_core::errors::{BatchResult, GraphError, RegistryError, TraceError};
use tracekit_core::types::{Transfer, TransferId};

use super::flow_graph::{FlowEdge, FlowGraph};
use super::temporal;
use crate::ledger::TransferLedger;
use crate::registry::NodeRegistry;

/// Builds flow graphs in a single chronological pass and extends them
/// one edge at a time.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlowGraphBuilder;

impl FlowGraphBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build from every registry node and ledger transfer.
    ///
    /// Transfers are inserted ordered by `(timestamp, id)`. A transfer that
    /// would break the time-ordered DAG is left out of the graph and
    /// reported in the batch errors.
    pub fn build(
        &self,
        registry: &NodeRegistry,
        ledger: &TransferLedger,
    ) -> BatchResult<FlowGraph> {
        let start = Instant::now();
        let mut result = BatchResult::new(FlowGraph::new());

        for node in registry.iter() {
            result.data.ensure_node(node);
        }

        for entry in ledger.chronological() {
            if let Err(e) = self.extend(&mut result.data, entry.id, &entry.transfer) {
                tracing::debug!(error = %e, "transfer excluded from flow graph");
                result.add_error(e);
            }
        }

        tracing::debug!(
            nodes = result.data.node_count(),
            edges = result.data.edge_count(),
            rejected = result.error_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "flow graph built"
        );
        result
    }

    /// Check `transfer` against the graph without inserting it.
    pub fn check(&self, graph: &FlowGraph, transfer: &Transfer) -> Result<(), TraceError> {
        let source = graph
            .get_node(&transfer.source_id)
            .ok_or_else(|| RegistryError::unknown(&transfer.source_id))?;
        let dest = graph
            .get_node(&transfer.dest_id)
            .ok_or_else(|| RegistryError::unknown(&transfer.dest_id))?;

        temporal::check_insertion(graph, source, dest, transfer.timestamp).map_err(|conflict| {
            GraphError::TemporalCycle {
                source_id: transfer.source_id.clone(),
                dest_id: transfer.dest_id.clone(),
                timestamp: transfer.timestamp,
                conflict,
            }
        })?;
        Ok(())
    }

    /// Insert one transfer, re-validating only paths through its endpoints.
    pub fn extend(
        &self,
        graph: &mut FlowGraph,
        id: TransferId,
        transfer: &Transfer,
    ) -> Result<(), TraceError> {
        self.check(graph, transfer)?;
        // Both endpoints exist: `check` looked them up.
        if let (Some(source), Some(dest)) = (
            graph.get_node(&transfer.source_id),
            graph.get_node(&transfer.dest_id),
        ) {
            graph.add_edge_unchecked(source, dest, FlowEdge::from_transfer(id, transfer));
        }
        Ok(())
    }
}
