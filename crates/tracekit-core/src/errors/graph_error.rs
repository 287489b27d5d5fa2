//! Flow graph errors.

use std::fmt;

use super::error_code::{self, TraceErrorCode};
use crate::types::Timestamp;

/// How a new edge would break the time-ordered DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalConflict {
    /// The destination already reaches the source.
    StructuralCycle,
    /// An edge upstream of the source is later than the new edge.
    ArrivalAfterDeparture { upstream_timestamp: Timestamp },
    /// An edge downstream of the destination is earlier than the new edge.
    DepartureBeforeArrival { downstream_timestamp: Timestamp },
}

impl fmt::Display for TemporalConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuralCycle => f.write_str("destination already reaches source"),
            Self::ArrivalAfterDeparture { upstream_timestamp } => {
                write!(f, "upstream transfer at {upstream_timestamp} is later")
            }
            Self::DepartureBeforeArrival {
                downstream_timestamp,
            } => write!(f, "downstream transfer at {downstream_timestamp} is earlier"),
        }
    }
}

/// Errors raised by the flow graph builder.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("Temporal cycle on {source_id} -> {dest_id} at {timestamp}: {conflict}")]
    TemporalCycle {
        source_id: String,
        dest_id: String,
        timestamp: Timestamp,
        conflict: TemporalConflict,
    },
}

impl TraceErrorCode for GraphError {
    fn error_code(&self) -> &'static str {
        error_code::TEMPORAL_CYCLE
    }
}
