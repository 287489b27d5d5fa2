//! Error handling for tracekit.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod error_code;
pub mod graph_error;
pub mod index_error;
pub mod registry_error;
pub mod schema_error;
pub mod sink_error;
pub mod trace_error;
pub mod transfer_error;

pub use config_error::ConfigError;
pub use error_code::TraceErrorCode;
pub use graph_error::{GraphError, TemporalConflict};
pub use index_error::IndexError;
pub use registry_error::RegistryError;
pub use schema_error::SchemaError;
pub use sink_error::SinkError;
pub use trace_error::{BatchResult, TraceError};
pub use transfer_error::{TransferError, TransferRejection};
