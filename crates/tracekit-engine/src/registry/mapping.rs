//! Mapping container-level readings onto the node active in the container.

use serde::{Deserialize, Serialize};
use tracekit_core::errors::RegistryError;
use tracekit_core::types::Timestamp;

use super::NodeRegistry;

/// A timestamped observation made at container level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerReading {
    pub container_id: String,
    #[serde(rename = "date_time")]
    pub timestamp: Timestamp,
}

impl ContainerReading {
    pub fn new(container_id: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            container_id: container_id.into(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingOptions {
    /// Emit readings with no active node as `node_id: None`.
    pub include_unmatched: bool,
    /// Emit one match per active node; otherwise several matches is an error.
    pub allow_multiple: bool,
}

impl Default for MappingOptions {
    fn default() -> Self {
        Self {
            include_unmatched: true,
            allow_multiple: true,
        }
    }
}

/// A reading (by position in the input) and the node it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingMatch {
    pub reading: usize,
    #[serde(rename = "segment_id")]
    pub node_id: Option<String>,
}

impl NodeRegistry {
    /// Map each reading to the node(s) whose container matches and whose
    /// interval contains the reading time (`start <= t < end`).
    ///
    /// Output is in input order; multiple matches for one reading are
    /// ordered by node start time, then id.
    pub fn map_container_readings(
        &self,
        readings: &[ContainerReading],
        options: MappingOptions,
    ) -> Result<Vec<ReadingMatch>, RegistryError> {
        let mut matches = Vec::with_capacity(readings.len());

        for (position, reading) in readings.iter().enumerate() {
            let mut active: Vec<_> = self
                .in_container(&reading.container_id)
                .filter(|n| n.is_active_at(reading.timestamp))
                .collect();
            active.sort_by(|a, b| (a.start_time, &a.id).cmp(&(b.start_time, &b.id)));

            if active.len() > 1 && !options.allow_multiple {
                return Err(RegistryError::AmbiguousMapping {
                    container_id: reading.container_id.clone(),
                    timestamp: reading.timestamp,
                    matches: active.iter().map(|n| n.id.clone()).collect(),
                });
            }

            if active.is_empty() {
                if options.include_unmatched {
                    matches.push(ReadingMatch {
                        reading: position,
                        node_id: None,
                    });
                }
                continue;
            }

            matches.extend(active.into_iter().map(|n| ReadingMatch {
                reading: position,
                node_id: Some(n.id.clone()),
            }));
        }

        Ok(matches)
    }
}
