//! # ddwatch-sdk
//!
//! Building blocks for republishing Datadog monitors as Prometheus metrics.
//!
//! - [`MetricRegistry`]: shared labeled-gauge storage
//! - [`Snapshotter`]: periodic fetch-and-publish loop over a
//!   [`MonitorSource`](ddwatch_adapters::MonitorSource)
//! - [`prometheus`] (`prometheus` feature, default): exposition format and
//!   the HTTP endpoint that serves it
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ddwatch_adapters::datadog::DatadogAdapter;
//! use ddwatch_sdk::prometheus::{PrometheusConfig, PrometheusExporter};
//! use ddwatch_sdk::Snapshotter;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = DatadogAdapter::builder()
//!         .credentials("api-key", "app-key")
//!         .build()?;
//!
//!     let snapshotter = Snapshotter::builder(adapter)
//!         .interval(Duration::from_secs(300))
//!         .build();
//!     let exporter = PrometheusExporter::new(PrometheusConfig::default(), snapshotter.registry());
//!
//!     let server = exporter.bind().await?;
//!     let _snapshots = snapshotter.start();
//!     server.serve().await?;
//!     Ok(())
//! }
//! ```

mod error;
mod registry;
mod snapshotter;

#[cfg(feature = "prometheus")]
pub mod prometheus;

pub use error::{ServerError, SnapshotError};
pub use registry::MetricRegistry;
pub use snapshotter::{PublishMode, SnapshotHandle, Snapshotter, SnapshotterBuilder, DEFAULT_INTERVAL};

// Re-export types for convenience
pub use ddwatch_types::{MetricSample, SampleLabels};
