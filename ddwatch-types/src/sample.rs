//! Labeled gauge samples derived from monitor records.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::MonitorRecord;

/// Label triple identifying one gauge sample.
///
/// Two samples with equal labels are the same series; setting one overwrites
/// the other.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampleLabels {
    /// Monitor identifier rendered as a decimal string.
    pub name: String,

    /// Priority such as `P1`, or empty when the monitor has none.
    pub priority: String,

    /// Monitor tags joined with `,` in their original order.
    pub tags: String,
}

impl SampleLabels {
    /// Create labels from raw values.
    pub fn new(
        name: impl Into<String>,
        priority: impl Into<String>,
        tags: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            priority: priority.into(),
            tags: tags.into(),
        }
    }

    /// Derive the label triple for a monitor.
    pub fn from_monitor(monitor: &MonitorRecord) -> Self {
        Self {
            name: monitor.id.to_string(),
            priority: monitor
                .priority
                .map(|p| p.to_string())
                .unwrap_or_default(),
            tags: monitor.tags.join(","),
        }
    }

    /// Label names and values in exposition order.
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("name", self.name.as_str()),
            ("priority", self.priority.as_str()),
            ("tags", self.tags.as_str()),
        ]
    }
}

/// A single labeled gauge observation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricSample {
    pub labels: SampleLabels,
    pub value: f64,
}

impl MetricSample {
    /// Value recorded for every monitor present in a snapshot.
    pub const PRESENT: f64 = 1.0;

    /// Create a sample.
    pub fn new(labels: SampleLabels, value: f64) -> Self {
        Self { labels, value }
    }

    /// Presence-indicator sample for a monitor: its label triple, valued 1.
    pub fn presence(monitor: &MonitorRecord) -> Self {
        Self::new(SampleLabels::from_monitor(monitor), Self::PRESENT)
    }

    /// Convert a batch of monitors into presence samples, preserving order.
    pub fn from_monitors(monitors: &[MonitorRecord]) -> Vec<MetricSample> {
        monitors.iter().map(MetricSample::presence).collect()
    }
}
