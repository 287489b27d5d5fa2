//! Population/segment nodes anchored to a container over a validity interval.

use serde::{Deserialize, Serialize};

/// Point in time. Unit-agnostic; microseconds since the epoch by convention.
pub type Timestamp = i64;

/// A population or segment living in one container over `[start_time, end_time)`.
///
/// `end_time == None` means the node is still active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "segment_id")]
    pub id: String,
    pub container_id: String,
    pub start_time: Timestamp,
    #[serde(default)]
    pub end_time: Option<Timestamp>,
}

impl Node {
    /// Create an open-ended node (still active).
    pub fn new(
        id: impl Into<String>,
        container_id: impl Into<String>,
        start_time: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            container_id: container_id.into(),
            start_time,
            end_time: None,
        }
    }

    /// Close the node at `end_time`.
    pub fn closed_at(mut self, end_time: Timestamp) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// A closed interval must be non-empty.
    pub fn has_valid_interval(&self) -> bool {
        self.end_time.map_or(true, |end| self.start_time < end)
    }

    /// Whether the node was active at `time`: `start <= time < end`.
    pub fn is_active_at(&self, time: Timestamp) -> bool {
        self.start_time <= time && self.end_time.map_or(true, |end| time < end)
    }

    /// Whether the validity interval intersects `window`.
    pub fn overlaps(&self, window: &TimeWindow) -> bool {
        self.start_time < window.end && self.end_time.map_or(true, |end| end > window.start)
    }
}

/// Half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeWindow {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, time: Timestamp) -> bool {
        self.start <= time && time < self.end
    }
}
