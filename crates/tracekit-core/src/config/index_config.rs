//! Traceability index configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IndexConfig {
    /// Update a published index in place when transfers are appended. Default: true.
    pub incremental: Option<bool>,
    /// Affected-origin fraction above which an update becomes a full rebuild. Default: 0.30.
    pub full_rebuild_ratio: Option<f64>,
}

impl IndexConfig {
    pub fn effective_incremental(&self) -> bool {
        self.incremental.unwrap_or(true)
    }

    pub fn effective_full_rebuild_ratio(&self) -> f64 {
        self.full_rebuild_ratio.unwrap_or(0.30)
    }
}
