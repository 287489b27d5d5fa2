//! Core data model: nodes, transfers, trace factors, and stock.

pub mod collections;
pub mod node;
pub mod stock;
pub mod trace;
pub mod transfer;

pub use node::{Node, TimeWindow, Timestamp};
pub use stock::{Quantities, StockTable};
pub use trace::{AggregateBy, Direction, IndexRow, TraceFactors};
pub use transfer::{Transfer, TransferId};
