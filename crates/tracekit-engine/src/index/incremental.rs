//! Incremental index maintenance after new transfers or stock changes.

use std::time::Instant;

use petgraph::stable_graph::NodeIndex;
use serde::Serialize;
use tracekit_core::errors::IndexError;
use tracekit_core::tracing::metrics;
use tracekit_core::traits::Cancellable;
use tracekit_core::types::collections::FxHashSet;
use tracekit_core::types::StockTable;

use super::{IndexBuilder, TraceabilityIndex};
use crate::graph::FlowGraph;
use crate::propagation::{propagate_origins, ComponentView};
use crate::registry::NodeRegistry;

/// How an update was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateOutcome {
    /// Only the listed number of origins were recomputed.
    Incremental { origins: usize },
    /// Too much of the graph was affected; the index was rebuilt.
    FullRebuild,
}

impl IndexBuilder {
    /// Recompute the entries whose origin lies on a path touching the new
    /// edge `source_id -> dest_id`, which must already be in `graph`.
    ///
    /// Pass the same node as source and destination after changing that
    /// node's stock.
    #[allow(clippy::too_many_arguments)]
    pub fn rebuild_affected(
        &self,
        index: &mut TraceabilityIndex,
        version: u64,
        registry: &NodeRegistry,
        graph: &FlowGraph,
        stock: &StockTable,
        source_id: &str,
        dest_id: &str,
        token: &(dyn Cancellable + Sync),
    ) -> Result<UpdateOutcome, IndexError> {
        self.rebuild_affected_many(
            index,
            version,
            registry,
            graph,
            stock,
            &[(source_id, dest_id)],
            token,
        )
    }

    /// Like [`rebuild_affected`](Self::rebuild_affected) for several edges at once.
    ///
    /// A new edge `s -> d` changes the outflow of `s` and the inflow of `d`.
    /// Forward shares move only for origins upstream of or at `s`; backward
    /// shares only for origins at or downstream of `d`. Falls back to a full
    /// rebuild when those origins exceed the configured fraction of all nodes.
    #[allow(clippy::too_many_arguments)]
    pub fn rebuild_affected_many(
        &self,
        index: &mut TraceabilityIndex,
        version: u64,
        registry: &NodeRegistry,
        graph: &FlowGraph,
        stock: &StockTable,
        changes: &[(&str, &str)],
        token: &(dyn Cancellable + Sync),
    ) -> Result<UpdateOutcome, IndexError> {
        let start = Instant::now();

        let mut affected: FxHashSet<NodeIndex> = FxHashSet::default();
        for &(source_id, dest_id) in changes {
            let source = lookup(graph, source_id)?;
            let dest = lookup(graph, dest_id)?;
            affected.insert(source);
            affected.insert(dest);
            affected.extend(graph.ancestors(source));
            affected.extend(graph.descendants(dest));
        }

        let total = registry.len().max(1);
        let ratio = affected.len() as f64 / total as f64;
        if ratio > self.full_rebuild_ratio {
            tracing::warn!(
                affected = affected.len(),
                total,
                threshold = self.full_rebuild_ratio,
                "affected share above threshold; falling back to full rebuild"
            );
            *index = self.build(version, registry, graph, stock, token)?;
            return Ok(UpdateOutcome::FullRebuild);
        }

        // Recompute per component so each view is built once.
        let mut pending: Vec<NodeIndex> = affected.into_iter().collect();
        pending.sort_unstable();
        let mut done: FxHashSet<NodeIndex> = FxHashSet::default();
        let mut recomputed = 0usize;

        for &node in &pending {
            if done.contains(&node) {
                continue;
            }
            let component = graph.component_of(node);
            let view = ComponentView::build(graph, &component, stock);

            let mut origins: Vec<usize> = Vec::new();
            for &member in &component {
                if pending.binary_search(&member).is_ok() && done.insert(member) {
                    if let Some(id) = graph.node_id(member) {
                        if let Some(&local) = view.local.get(id) {
                            origins.push(local);
                        }
                    }
                }
            }
            origins.sort_by(|a, b| view.ids[*a].cmp(&view.ids[*b]));

            for shares in propagate_origins(&view, origins, token)? {
                if !registry.contains(&shares.origin_id) {
                    continue;
                }
                let entries = index.entries_from(&shares);
                index.replace_origin(&shares.origin_id, entries);
                recomputed += 1;
            }
        }

        index.set_version(version);
        tracing::debug!(
            { metrics::INDEX_UPDATE_TIME } = start.elapsed().as_millis() as u64,
            { metrics::ORIGINS_TRACED } = recomputed,
            { metrics::SNAPSHOT_VERSION } = version,
            "traceability index updated"
        );
        Ok(UpdateOutcome::Incremental {
            origins: recomputed,
        })
    }
}

fn lookup(graph: &FlowGraph, node_id: &str) -> Result<NodeIndex, IndexError> {
    graph
        .get_node(node_id)
        .ok_or_else(|| IndexError::UnknownOrigin {
            node_id: node_id.to_string(),
        })
}
