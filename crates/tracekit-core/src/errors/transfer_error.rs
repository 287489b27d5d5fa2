//! Transfer validation errors.

use std::fmt;

use super::error_code::{self, TraceErrorCode};
use crate::types::Timestamp;

/// Why the ledger refused a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferRejection {
    UnknownSource,
    UnknownDestination,
    SelfLoop,
    ZeroQuantity,
    InvalidBiomass,
    BeforeSourceStart { source_start: Timestamp },
    AfterSourceEnd { source_end: Timestamp },
    BeforeDestinationStart { dest_start: Timestamp },
    AfterDestinationEnd { dest_end: Timestamp },
}

impl fmt::Display for TransferRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSource => f.write_str("unknown source node"),
            Self::UnknownDestination => f.write_str("unknown destination node"),
            Self::SelfLoop => f.write_str("source and destination are the same node"),
            Self::ZeroQuantity => f.write_str("zero count and zero biomass"),
            Self::InvalidBiomass => f.write_str("biomass is negative or not finite"),
            Self::BeforeSourceStart { source_start } => {
                write!(f, "before source start {source_start}")
            }
            Self::AfterSourceEnd { source_end } => write!(f, "after source end {source_end}"),
            Self::BeforeDestinationStart { dest_start } => {
                write!(f, "before destination start {dest_start}")
            }
            Self::AfterDestinationEnd { dest_end } => {
                write!(f, "at or after destination end {dest_end}")
            }
        }
    }
}

/// Errors raised when appending transfers to the ledger.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransferError {
    #[error("Invalid transfer {source_id} -> {dest_id} at {timestamp}: {reason}")]
    Invalid {
        source_id: String,
        dest_id: String,
        timestamp: Timestamp,
        reason: TransferRejection,
    },
}

impl TransferError {
    pub fn reason(&self) -> TransferRejection {
        match self {
            Self::Invalid { reason, .. } => *reason,
        }
    }
}

impl TraceErrorCode for TransferError {
    fn error_code(&self) -> &'static str {
        error_code::INVALID_TRANSFER
    }
}
