//! Error types for the snapshot loop and the metrics server.

use std::time::Duration;

use ddwatch_adapters::AdapterError;
use thiserror::Error;

/// Errors that end a snapshot cycle.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The monitor source could not be listed.
    #[error("monitor source unavailable: {0}")]
    SourceUnavailable(#[source] AdapterError),

    /// The interval is zero or too long to schedule.
    #[error("invalid snapshot interval: {0:?}")]
    InvalidInterval(Duration),

    /// The background snapshot task panicked or was cancelled.
    #[error("snapshot task failed: {0}")]
    Task(String),
}

/// Errors from the metrics HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured listen address is not a valid socket address.
    #[error("invalid listen address {addr:?}: {reason}")]
    InvalidAddress { addr: String, reason: String },

    /// Binding or accepting failed.
    #[error("metrics server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
