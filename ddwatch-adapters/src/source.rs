//! The seam between the snapshot loop and whatever supplies monitors.

use async_trait::async_trait;
use ddwatch_types::MonitorRecord;

use crate::AdapterError;

/// A source of monitor records.
///
/// Each call performs one complete fetch. Implementations must not retry;
/// failures are reported to the caller as-is.
#[async_trait]
pub trait MonitorSource: Send + Sync {
    /// Fetch the current list of monitors.
    async fn list_monitors(&self) -> Result<Vec<MonitorRecord>, AdapterError>;

    /// Short human-readable description used in logs.
    fn description(&self) -> String;
}

#[async_trait]
impl<S: MonitorSource + ?Sized> MonitorSource for std::sync::Arc<S> {
    async fn list_monitors(&self) -> Result<Vec<MonitorRecord>, AdapterError> {
        (**self).list_monitors().await
    }

    fn description(&self) -> String {
        (**self).description()
    }
}
