//! Aggregate error and non-fatal error collection for batch loads.

use super::error_code::TraceErrorCode;
use super::{
    ConfigError, GraphError, IndexError, RegistryError, SchemaError, SinkError, TransferError,
};

/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

impl TraceErrorCode for TraceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Registry(e) => e.error_code(),
            Self::Transfer(e) => e.error_code(),
            Self::Graph(e) => e.error_code(),
            Self::Index(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Sink(e) => e.error_code(),
            Self::Schema(e) => e.error_code(),
        }
    }
}

/// Result of a batch operation that accumulates per-record errors.
/// Offending records are skipped; the rest of the batch is applied.
#[derive(Debug, Default)]
pub struct BatchResult<T: Default = ()> {
    /// The successful result data.
    pub data: T,
    /// Per-record errors, in the order records were applied.
    pub errors: Vec<TraceError>,
}

impl<T: Default> BatchResult<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: impl Into<TraceError>) {
        self.errors.push(error.into());
    }

    /// Returns true if there are no per-record errors.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Absorb another batch's errors, returning its data.
    pub fn absorb<U: Default>(&mut self, other: BatchResult<U>) -> U {
        self.errors.extend(other.errors);
        other.data
    }
}
