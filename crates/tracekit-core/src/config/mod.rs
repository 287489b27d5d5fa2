//! Configuration system for tracekit.
//! TOML-based, layered resolution: overrides > env > project > defaults.

pub mod index_config;
pub mod ledger_config;
pub mod propagation_config;
pub mod tracekit_config;

pub use index_config::IndexConfig;
pub use ledger_config::{LedgerConfig, ZeroTransferPolicy};
pub use propagation_config::PropagationConfig;
pub use tracekit_config::{ConfigOverrides, TracekitConfig};
