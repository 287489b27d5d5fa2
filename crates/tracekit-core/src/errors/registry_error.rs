//! Node registry errors.

use super::error_code::{self, TraceErrorCode};
use crate::types::Timestamp;

/// Errors raised by the node registry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("Unknown node: {node_id}")]
    UnknownNode { node_id: String },

    #[error("Duplicate node: {node_id}")]
    DuplicateNode { node_id: String },

    #[error("Invalid interval for node {node_id}: start {start} is not before end {end}")]
    InvalidInterval {
        node_id: String,
        start: Timestamp,
        end: Timestamp,
    },

    #[error("Reading for {container_id} at {timestamp} matches several nodes: {matches:?}")]
    AmbiguousMapping {
        container_id: String,
        timestamp: Timestamp,
        matches: Vec<String>,
    },
}

impl RegistryError {
    pub fn unknown(node_id: impl Into<String>) -> Self {
        Self::UnknownNode {
            node_id: node_id.into(),
        }
    }
}

impl TraceErrorCode for RegistryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownNode { .. } => error_code::UNKNOWN_NODE,
            Self::DuplicateNode { .. } => error_code::DUPLICATE_NODE,
            Self::InvalidInterval { .. } => error_code::INVALID_NODE,
            Self::AmbiguousMapping { .. } => error_code::AMBIGUOUS_MAPPING,
        }
    }
}
