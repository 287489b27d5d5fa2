//! Share propagation engine.
//!
//! Each weakly-connected component is laid out once as a [`ComponentView`];
//! forward and backward passes for every origin in it share that view's
//! topological order. Components are independent and may run in parallel.

pub mod backward;
pub mod components;
pub mod forward;
pub mod view;

use petgraph::stable_graph::NodeIndex;
use rayon::prelude::*;
use tracekit_core::config::PropagationConfig;
use tracekit_core::errors::IndexError;
use tracekit_core::tracing::metrics;
use tracekit_core::traits::Cancellable;
use tracekit_core::types::StockTable;

use crate::graph::FlowGraph;

pub use backward::backward_shares;
pub use forward::forward_shares;
pub use view::{ComponentView, WeightedEdge};

/// Shares computed for one origin, traced ids ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginShares {
    pub origin_id: String,
    pub forward: Vec<(String, [f64; 2])>,
    pub backward: Vec<(String, [f64; 2])>,
}

/// Runs propagation over components, optionally in parallel.
#[derive(Debug, Clone, Default)]
pub struct Propagator {
    parallel: bool,
    threads: Option<usize>,
}

impl Propagator {
    pub fn new(config: &PropagationConfig) -> Self {
        Self {
            parallel: config.effective_parallel(),
            threads: config.threads,
        }
    }

    pub fn sequential() -> Self {
        Self {
            parallel: false,
            threads: None,
        }
    }

    /// Shares for every node of the graph, ordered by origin id.
    pub fn propagate_all(
        &self,
        graph: &FlowGraph,
        stock: &StockTable,
        token: &(dyn Cancellable + Sync),
    ) -> Result<Vec<OriginShares>, IndexError> {
        let components = components::weakly_connected(graph);
        tracing::debug!(
            { metrics::COMPONENT_COUNT } = components.len(),
            "propagating components"
        );

        let run = |nodes: &Vec<NodeIndex>| -> Result<Vec<OriginShares>, IndexError> {
            if token.is_cancelled() {
                return Err(IndexError::Cancelled);
            }
            let view = ComponentView::build(graph, nodes, stock);
            propagate_origins(&view, 0..view.len(), token)
        };

        let per_component: Vec<Vec<OriginShares>> = if self.parallel {
            self.in_pool(|| {
                components
                    .par_iter()
                    .map(run)
                    .collect::<Result<Vec<_>, IndexError>>()
            })?
        } else {
            components
                .iter()
                .map(run)
                .collect::<Result<Vec<_>, IndexError>>()?
        };

        let mut all: Vec<OriginShares> = per_component.into_iter().flatten().collect();
        all.sort_by(|a, b| a.origin_id.cmp(&b.origin_id));
        Ok(all)
    }

    fn in_pool<T: Send>(&self, job: impl FnOnce() -> T + Send) -> T {
        match self.threads {
            Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(job),
                Err(e) => {
                    tracing::warn!(error = %e, "thread pool unavailable; using global pool");
                    job()
                }
            },
            None => job(),
        }
    }
}

/// Forward and backward shares for the given local origins of `view`.
pub fn propagate_origins(
    view: &ComponentView,
    origins: impl IntoIterator<Item = usize>,
    token: &dyn Cancellable,
) -> Result<Vec<OriginShares>, IndexError> {
    let mut out = Vec::new();
    for origin in origins {
        if token.is_cancelled() {
            return Err(IndexError::Cancelled);
        }
        out.push(OriginShares {
            origin_id: view.ids[origin].clone(),
            forward: named(view, forward_shares(view, origin)),
            backward: named(view, backward_shares(view, origin)),
        });
    }
    Ok(out)
}

fn named(view: &ComponentView, shares: Vec<(usize, [f64; 2])>) -> Vec<(String, [f64; 2])> {
    let mut named: Vec<(String, [f64; 2])> = shares
        .into_iter()
        .map(|(u, s)| (view.ids[u].clone(), s))
        .collect();
    named.sort_by(|a, b| a.0.cmp(&b.0));
    named
}
