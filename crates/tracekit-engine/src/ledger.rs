//! Transfer ledger: validated, append-only, time-indexed per node.

use serde::Serialize;
use tracekit_core::config::{LedgerConfig, ZeroTransferPolicy};
use tracekit_core::errors::{BatchResult, TransferError, TransferRejection};
use tracekit_core::types::collections::FxHashMap;
use tracekit_core::types::{Node, Quantities, Transfer, TransferId};

use crate::registry::NodeRegistry;

/// A stored transfer with its ledger-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub id: TransferId,
    #[serde(flatten)]
    pub transfer: Transfer,
}

/// Outcome of validating a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accept,
    /// Moves nothing and the ledger is configured to drop such transfers.
    Ignore,
}

#[derive(Debug, Clone, Copy)]
struct LedgerPolicy {
    transfer_at_source_end: bool,
    zero_transfers: ZeroTransferPolicy,
}

impl From<&LedgerConfig> for LedgerPolicy {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            transfer_at_source_end: config.effective_transfer_at_source_end(),
            zero_transfers: config.effective_zero_transfers(),
        }
    }
}

/// Append-only store of transfers.
///
/// Stored transfers are never reordered or mutated. Per-node views are kept
/// sorted by `(timestamp, id)`, so ties fall back to insertion order.
#[derive(Debug, Clone)]
pub struct TransferLedger {
    entries: Vec<LedgerEntry>,
    outgoing: FxHashMap<String, Vec<usize>>,
    incoming: FxHashMap<String, Vec<usize>>,
    policy: LedgerPolicy,
}

impl Default for TransferLedger {
    fn default() -> Self {
        Self::new(&LedgerConfig::default())
    }
}

impl TransferLedger {
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            entries: Vec::new(),
            outgoing: FxHashMap::default(),
            incoming: FxHashMap::default(),
            policy: LedgerPolicy::from(config),
        }
    }

    /// Validate a transfer against the registry without storing it.
    pub fn check(
        &self,
        registry: &NodeRegistry,
        transfer: &Transfer,
    ) -> Result<Admission, TransferError> {
        let reject = |reason| TransferError::Invalid {
            source_id: transfer.source_id.clone(),
            dest_id: transfer.dest_id.clone(),
            timestamp: transfer.timestamp,
            reason,
        };

        let source = registry
            .get(&transfer.source_id)
            .map_err(|_| reject(TransferRejection::UnknownSource))?;
        let dest = registry
            .get(&transfer.dest_id)
            .map_err(|_| reject(TransferRejection::UnknownDestination))?;

        if source.id == dest.id {
            return Err(reject(TransferRejection::SelfLoop));
        }
        if !transfer.biomass_kg.is_finite() || transfer.biomass_kg < 0.0 {
            return Err(reject(TransferRejection::InvalidBiomass));
        }
        if transfer.is_noop() {
            return match self.policy.zero_transfers {
                ZeroTransferPolicy::Reject => Err(reject(TransferRejection::ZeroQuantity)),
                ZeroTransferPolicy::Ignore => Ok(Admission::Ignore),
            };
        }

        self.check_interval(source, dest, transfer).map_err(reject)?;
        Ok(Admission::Accept)
    }

    fn check_interval(
        &self,
        source: &Node,
        dest: &Node,
        transfer: &Transfer,
    ) -> Result<(), TransferRejection> {
        let t = transfer.timestamp;
        if t < source.start_time {
            return Err(TransferRejection::BeforeSourceStart {
                source_start: source.start_time,
            });
        }
        if let Some(end) = source.end_time {
            let past_end = if self.policy.transfer_at_source_end {
                t > end
            } else {
                t >= end
            };
            if past_end {
                return Err(TransferRejection::AfterSourceEnd { source_end: end });
            }
        }
        if t < dest.start_time {
            return Err(TransferRejection::BeforeDestinationStart {
                dest_start: dest.start_time,
            });
        }
        if let Some(end) = dest.end_time {
            if t >= end {
                return Err(TransferRejection::AfterDestinationEnd { dest_end: end });
            }
        }
        Ok(())
    }

    /// Validate and store a transfer. `Ok(None)` when it was ignored.
    pub fn append(
        &mut self,
        registry: &NodeRegistry,
        transfer: Transfer,
    ) -> Result<Option<TransferId>, TransferError> {
        match self.check(registry, &transfer)? {
            Admission::Accept => Ok(Some(self.commit(transfer))),
            Admission::Ignore => Ok(None),
        }
    }

    /// Append many transfers; offending records are skipped and reported.
    pub fn append_all(
        &mut self,
        registry: &NodeRegistry,
        transfers: impl IntoIterator<Item = Transfer>,
    ) -> BatchResult<Vec<TransferId>> {
        let mut result = BatchResult::new(Vec::new());
        for transfer in transfers {
            match self.append(registry, transfer) {
                Ok(Some(id)) => result.data.push(id),
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "transfer rejected");
                    result.add_error(e);
                }
            }
        }
        result
    }

    /// Store an already-validated transfer.
    pub(crate) fn commit(&mut self, transfer: Transfer) -> TransferId {
        let position = self.entries.len();
        let id = TransferId(position as u64);
        let timestamp = transfer.timestamp;

        for (map, node_id) in [
            (&mut self.outgoing, &transfer.source_id),
            (&mut self.incoming, &transfer.dest_id),
        ] {
            let list = map.entry(node_id.clone()).or_default();
            let at = list.partition_point(|&i| self.entries[i].transfer.timestamp <= timestamp);
            list.insert(at, position);
        }

        self.entries.push(LedgerEntry { id, transfer });
        id
    }

    /// Transfers leaving `node_id`, ordered by time then insertion.
    pub fn transfers_from<'a>(
        &'a self,
        node_id: &str,
    ) -> impl Iterator<Item = &'a LedgerEntry> + 'a {
        self.view(&self.outgoing, node_id)
    }

    /// Transfers arriving at `node_id`, ordered by time then insertion.
    pub fn transfers_to<'a>(
        &'a self,
        node_id: &str,
    ) -> impl Iterator<Item = &'a LedgerEntry> + 'a {
        self.view(&self.incoming, node_id)
    }

    fn view<'a>(
        &'a self,
        map: &'a FxHashMap<String, Vec<usize>>,
        node_id: &str,
    ) -> impl Iterator<Item = &'a LedgerEntry> + 'a {
        map.get(node_id)
            .into_iter()
            .flatten()
            .map(move |&i| &self.entries[i])
    }

    /// Total quantities leaving `node_id`.
    pub fn outflow(&self, node_id: &str) -> Quantities {
        sum_quantities(self.transfers_from(node_id))
    }

    /// Total quantities arriving at `node_id`.
    pub fn inflow(&self, node_id: &str) -> Quantities {
        sum_quantities(self.transfers_to(node_id))
    }

    pub fn has_outflow(&self, node_id: &str) -> bool {
        self.outgoing.contains_key(node_id)
    }

    pub fn has_inflow(&self, node_id: &str) -> bool {
        self.incoming.contains_key(node_id)
    }

    /// Registered nodes that never received a transfer, ordered by id.
    pub fn nodes_without_inflow<'a>(&self, registry: &'a NodeRegistry) -> Vec<&'a Node> {
        registry.iter().filter(|n| !self.has_inflow(&n.id)).collect()
    }

    /// Registered nodes that never sent a transfer, ordered by id.
    pub fn nodes_without_outflow<'a>(&self, registry: &'a NodeRegistry) -> Vec<&'a Node> {
        registry.iter().filter(|n| !self.has_outflow(&n.id)).collect()
    }

    pub fn get(&self, id: TransferId) -> Option<&LedgerEntry> {
        self.entries.get(id.0 as usize)
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter()
    }

    /// All entries ordered by `(timestamp, id)`.
    pub fn chronological(&self) -> Vec<&LedgerEntry> {
        let mut sorted: Vec<&LedgerEntry> = self.entries.iter().collect();
        sorted.sort_by_key(|e| (e.transfer.timestamp, e.id));
        sorted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn sum_quantities<'a>(entries: impl Iterator<Item = &'a LedgerEntry>) -> Quantities {
    let mut total = Quantities::ZERO;
    for entry in entries {
        total += Quantities::new(entry.transfer.count as f64, entry.transfer.biomass_kg);
    }
    total
}
