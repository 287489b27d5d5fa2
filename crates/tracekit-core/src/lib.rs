//! # tracekit-core
//!
//! Foundation crate for the tracekit traceability engine.
//! Defines the node/transfer/trace types, the stable schema field names,
//! errors, config, tracing setup, and the boundary traits.
//! The engine crate depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod schema;
pub mod tracing;
pub mod traits;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::TracekitConfig;
pub use errors::{TraceError, TraceErrorCode};
pub use types::{
    AggregateBy, Direction, IndexRow, Node, Quantities, StockTable, TimeWindow, Timestamp,
    TraceFactors, Transfer, TransferId,
};
