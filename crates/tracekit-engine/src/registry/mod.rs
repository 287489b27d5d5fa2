//! Node registry: canonical identity and validity intervals.

mod mapping;

use std::collections::BTreeMap;

use tracekit_core::errors::{BatchResult, RegistryError};
use tracekit_core::types::collections::FxHashMap;
use tracekit_core::types::{Node, Timestamp};

pub use mapping::{ContainerReading, MappingOptions, ReadingMatch};

/// Registered nodes keyed by id, plus a per-container index.
///
/// Nodes are immutable once registered.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: BTreeMap<String, Node>,
    by_container: FxHashMap<String, Vec<String>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node. Fails on a duplicate id or an empty closed interval.
    pub fn register(&mut self, node: Node) -> Result<(), RegistryError> {
        if self.nodes.contains_key(&node.id) {
            return Err(RegistryError::DuplicateNode { node_id: node.id });
        }
        if let (false, Some(end)) = (node.has_valid_interval(), node.end_time) {
            return Err(RegistryError::InvalidInterval {
                node_id: node.id,
                start: node.start_time,
                end,
            });
        }
        self.by_container
            .entry(node.container_id.clone())
            .or_default()
            .push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Register many nodes; offending records are skipped and reported.
    pub fn register_all(&mut self, nodes: impl IntoIterator<Item = Node>) -> BatchResult<usize> {
        let mut result = BatchResult::new(0);
        for node in nodes {
            match self.register(node) {
                Ok(()) => result.data += 1,
                Err(e) => {
                    tracing::debug!(error = %e, "node rejected");
                    result.add_error(e);
                }
            }
        }
        result
    }

    pub fn get(&self, node_id: &str) -> Result<&Node, RegistryError> {
        self.nodes
            .get(node_id)
            .ok_or_else(|| RegistryError::unknown(node_id))
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Whether `node_id` was active at `time`.
    pub fn validity_at(&self, node_id: &str, time: Timestamp) -> Result<bool, RegistryError> {
        Ok(self.get(node_id)?.is_active_at(time))
    }

    /// All nodes active at `time`, ordered by id.
    pub fn active_at(&self, time: Timestamp) -> Vec<&Node> {
        self.nodes.values().filter(|n| n.is_active_at(time)).collect()
    }

    /// Nodes hosted by `container_id`, in registration order.
    pub fn in_container<'a>(&'a self, container_id: &str) -> impl Iterator<Item = &'a Node> + 'a {
        self.by_container
            .get(container_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.nodes.get(id))
    }

    /// Nodes ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
