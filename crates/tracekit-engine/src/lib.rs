//! # tracekit-engine
//!
//! Lineage attribution over a time-ordered flow graph.
//!
//! - Node registry and transfer ledger (validated, append-only inputs)
//! - Flow graph with time-ordered DAG enforcement
//! - Forward and backward share propagation per weakly-connected component
//! - Traceability index with full and incremental builds
//! - `TraceEngine`: versioned snapshots, single writer, atomic index publish

pub mod aggregation;
pub mod engine;
pub mod export;
pub mod graph;
pub mod index;
pub mod ledger;
pub mod propagation;
pub mod registry;

pub use aggregation::{AggregateValue, Aggregation, NodeValues};
pub use engine::{LedgerSnapshot, LoadSummary, TraceEngine};
pub use graph::{FlowGraph, FlowGraphBuilder};
pub use index::{FactorScope, IndexBuilder, IndexEntry, TraceabilityIndex, UpdateOutcome};
pub use ledger::{Admission, LedgerEntry, TransferLedger};
pub use propagation::{OriginShares, Propagator};
pub use registry::{ContainerReading, MappingOptions, NodeRegistry, ReadingMatch};
