//! Index sink errors.

use super::error_code::{self, TraceErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Sink write failed: {message}")]
    Write { message: String },

    #[error("Row serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<std::io::Error> for SinkError {
    fn from(e: std::io::Error) -> Self {
        Self::Write {
            message: e.to_string(),
        }
    }
}

impl TraceErrorCode for SinkError {
    fn error_code(&self) -> &'static str {
        error_code::SINK_ERROR
    }
}
