//! Monitor records as reported by the Datadog monitors API.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// A single alert monitor definition together with its current state.
///
/// Records are immutable once fetched and live only for the snapshot cycle
/// that fetched them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitorRecord {
    /// Datadog monitor identifier.
    pub id: i64,

    /// Display name of the monitor.
    pub name: String,

    /// Priority assigned to the monitor, if any.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub priority: Option<Priority>,

    /// Current aggregate alert state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub overall_state: MonitorState,

    /// Tags attached to the monitor, in the order the API returned them.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<String>,
}

impl MonitorRecord {
    /// Create a builder for a monitor with the given identifier.
    pub fn builder(id: i64) -> MonitorRecordBuilder {
        MonitorRecordBuilder::new(id)
    }

    /// Whether the monitor is currently triggered (alert or warn).
    pub fn is_triggered(&self) -> bool {
        matches!(self.overall_state, MonitorState::Alert | MonitorState::Warn)
    }
}

/// Builder for constructing `MonitorRecord` instances.
#[derive(Debug)]
pub struct MonitorRecordBuilder {
    record: MonitorRecord,
}

impl MonitorRecordBuilder {
    fn new(id: i64) -> Self {
        Self {
            record: MonitorRecord {
                id,
                name: String::new(),
                priority: None,
                overall_state: MonitorState::default(),
                tags: Vec::new(),
            },
        }
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.record.name = name.into();
        self
    }

    /// Set the priority.
    pub fn priority(mut self, priority: Priority) -> Self {
        self.record.priority = Some(priority);
        self
    }

    /// Set the alert state.
    pub fn state(mut self, state: MonitorState) -> Self {
        self.record.overall_state = state;
        self
    }

    /// Append a tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.record.tags.push(tag.into());
        self
    }

    /// Build the record.
    pub fn build(self) -> MonitorRecord {
        self.record
    }
}

/// Monitor priority, from `P1` (most urgent) to `P5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Priority(u8);

impl Priority {
    pub const P1: Priority = Priority(1);
    pub const P2: Priority = Priority(2);
    pub const P3: Priority = Priority(3);
    pub const P4: Priority = Priority(4);
    pub const P5: Priority = Priority(5);

    /// Create a priority from its numeric level. Returns `None` outside `1..=5`.
    pub const fn new(level: u8) -> Option<Self> {
        if level >= 1 && level <= 5 {
            Some(Priority(level))
        } else {
            None
        }
    }

    /// Numeric level of the priority.
    pub const fn level(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Error returned when a numeric priority is outside `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPriority(pub u8);

impl fmt::Display for InvalidPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "priority must be between 1 and 5, got {}", self.0)
    }
}

impl TryFrom<u8> for Priority {
    type Error = InvalidPriority;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Priority::new(level).ok_or(InvalidPriority(level))
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> u8 {
        priority.0
    }
}

/// Aggregate alert state of a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MonitorState {
    #[cfg_attr(feature = "serde", serde(rename = "OK"))]
    Ok,
    Alert,
    Warn,
    #[cfg_attr(feature = "serde", serde(rename = "No Data"))]
    NoData,
    Ignored,
    Skipped,
    #[default]
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

impl MonitorState {
    /// Parse the state string used by the Datadog API.
    ///
    /// Unrecognized values map to `Unknown`.
    pub fn from_api(s: &str) -> Self {
        match s {
            "OK" => MonitorState::Ok,
            "Alert" => MonitorState::Alert,
            "Warn" => MonitorState::Warn,
            "No Data" => MonitorState::NoData,
            "Ignored" => MonitorState::Ignored,
            "Skipped" => MonitorState::Skipped,
            _ => MonitorState::Unknown,
        }
    }

    /// The state string used by the Datadog API.
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorState::Ok => "OK",
            MonitorState::Alert => "Alert",
            MonitorState::Warn => "Warn",
            MonitorState::NoData => "No Data",
            MonitorState::Ignored => "Ignored",
            MonitorState::Skipped => "Skipped",
            MonitorState::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
