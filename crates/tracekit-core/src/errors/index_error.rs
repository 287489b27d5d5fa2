//! Traceability index errors.

use super::error_code::{self, TraceErrorCode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndexError {
    #[error("Traceability index has not been built")]
    NotBuilt,

    #[error("Index build cancelled")]
    Cancelled,

    #[error("Origin {node_id} is not in the index")]
    UnknownOrigin { node_id: String },
}

impl TraceErrorCode for IndexError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotBuilt => error_code::INDEX_NOT_BUILT,
            Self::Cancelled => error_code::CANCELLED,
            Self::UnknownOrigin { .. } => error_code::UNKNOWN_NODE,
        }
    }
}
