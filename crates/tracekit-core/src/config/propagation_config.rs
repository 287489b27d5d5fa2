//! Share propagation configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the share propagation engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PropagationConfig {
    /// Propagate independent components in parallel. Default: true.
    pub parallel: Option<bool>,
    /// Size of the dedicated thread pool. Default: rayon's global pool.
    pub threads: Option<usize>,
    /// Directional entries whose factors are all below this are omitted. Default: 0.0.
    pub min_share: Option<f64>,
}

impl PropagationConfig {
    /// Returns the effective parallel flag, defaulting to true.
    pub fn effective_parallel(&self) -> bool {
        self.parallel.unwrap_or(true)
    }

    /// Returns the effective minimum share, defaulting to 0.0.
    pub fn effective_min_share(&self) -> f64 {
        self.min_share.unwrap_or(0.0)
    }
}
