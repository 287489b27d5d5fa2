//! Errors parsing schema enumerations from their string form.

use super::error_code::{self, TraceErrorCode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Unknown value {value:?} for {field}")]
    UnknownValue { field: &'static str, value: String },
}

impl TraceErrorCode for SchemaError {
    fn error_code(&self) -> &'static str {
        error_code::SCHEMA_ERROR
    }
}
