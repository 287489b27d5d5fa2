//! TraceErrorCode trait: stable string codes for every error.

/// Every error enum implements this to expose a structured code string
/// that survives across process and language boundaries.
pub trait TraceErrorCode {
    /// Returns the error code string (e.g., "UNKNOWN_NODE").
    fn error_code(&self) -> &'static str;

    /// Returns `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const UNKNOWN_NODE: &str = "UNKNOWN_NODE";
pub const DUPLICATE_NODE: &str = "DUPLICATE_NODE";
pub const INVALID_NODE: &str = "INVALID_NODE";
pub const AMBIGUOUS_MAPPING: &str = "AMBIGUOUS_MAPPING";
pub const INVALID_TRANSFER: &str = "INVALID_TRANSFER";
pub const TEMPORAL_CYCLE: &str = "TEMPORAL_CYCLE";
pub const INDEX_NOT_BUILT: &str = "INDEX_NOT_BUILT";
pub const CANCELLED: &str = "CANCELLED";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const SINK_ERROR: &str = "SINK_ERROR";
pub const SCHEMA_ERROR: &str = "SCHEMA_ERROR";
