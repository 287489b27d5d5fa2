//! Read boundary: where nodes and transfers come from.

use crate::types::{Node, Transfer};

/// Materialized node and transfer records, in any order.
///
/// The engine sorts transfers itself before building.
pub trait RecordSource {
    fn nodes(&self) -> Vec<Node>;

    fn transfers(&self) -> Vec<Transfer>;
}

/// In-memory source backed by owned vectors.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pub nodes: Vec<Node>,
    pub transfers: Vec<Transfer>,
}

impl StaticSource {
    pub fn new(nodes: Vec<Node>, transfers: Vec<Transfer>) -> Self {
        Self { nodes, transfers }
    }
}

impl RecordSource for StaticSource {
    fn nodes(&self) -> Vec<Node> {
        self.nodes.clone()
    }

    fn transfers(&self) -> Vec<Transfer> {
        self.transfers.clone()
    }
}
