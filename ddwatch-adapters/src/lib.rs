//! # ddwatch-adapters
//!
//! Monitor sources for ddwatch.
//!
//! A [`MonitorSource`] produces the list of monitors for one snapshot cycle.
//! The crate ships one implementation:
//!
//! - **Datadog** (`datadog` feature, default) - Lists monitors through the
//!   Datadog v1 monitors API
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ddwatch_adapters::datadog::DatadogAdapter;
//! use ddwatch_adapters::MonitorSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = DatadogAdapter::builder()
//!         .credentials("api-key", "app-key")
//!         .site("datadoghq.eu")
//!         .build()?;
//!
//!     let monitors = adapter.list_monitors().await?;
//!     println!("Fetched {} monitors", monitors.len());
//!     Ok(())
//! }
//! ```

pub mod error;
mod source;

#[cfg(feature = "datadog")]
pub mod datadog;

pub use error::AdapterError;
pub use source::MonitorSource;

// Re-export types for convenience
pub use ddwatch_types::{MonitorRecord, MonitorState, Priority};
