//! Transfer ledger configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the ledger does with a transfer that moves nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroTransferPolicy {
    /// Report `InvalidTransferError`.
    #[default]
    Reject,
    /// Drop silently.
    Ignore,
}

impl FromStr for ZeroTransferPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "ignore" => Ok(Self::Ignore),
            other => Err(format!("expected \"reject\" or \"ignore\", got {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LedgerConfig {
    /// Accept a transfer stamped exactly at the source's end time. Default: true.
    pub transfer_at_source_end: Option<bool>,
    /// Handling of zero-count, zero-biomass transfers. Default: reject.
    pub zero_transfers: Option<ZeroTransferPolicy>,
}

impl LedgerConfig {
    pub fn effective_transfer_at_source_end(&self) -> bool {
        self.transfer_at_source_end.unwrap_or(true)
    }

    pub fn effective_zero_transfers(&self) -> ZeroTransferPolicy {
        self.zero_transfers.unwrap_or_default()
    }
}
