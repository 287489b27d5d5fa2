//! Structured span field names.
//!
//! Used consistently in tracing events across the engine so logs can be
//! queried by field.

/// Full index build time in milliseconds.
pub const INDEX_BUILD_TIME: &str = "index_build_time";

/// Incremental index update time in milliseconds.
pub const INDEX_UPDATE_TIME: &str = "index_update_time";

/// Number of origins propagated in a build or update.
pub const ORIGINS_TRACED: &str = "origins_traced";

/// Number of index entries produced.
pub const ENTRIES_WRITTEN: &str = "entries_written";

/// Number of weakly-connected components in the flow graph.
pub const COMPONENT_COUNT: &str = "component_count";

/// Number of records rejected in a batch load.
pub const RECORDS_REJECTED: &str = "records_rejected";

/// Ledger snapshot version.
pub const SNAPSHOT_VERSION: &str = "snapshot_version";
