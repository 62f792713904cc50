//! # ddwatch
//!
//! Polls the Datadog monitor API on a fixed interval and republishes every
//! monitor as a Prometheus gauge sample.
//!
//! ```text
//! ┌──────────────┐    ┌─────────────┐    ┌────────────────┐    ┌────────────┐
//! │ Datadog API  │───▶│ Snapshotter │───▶│ MetricRegistry │───▶│ /metrics   │
//! │ (adapters)   │    │   (sdk)     │    │     (sdk)      │    │ (hyper)    │
//! └──────────────┘    └─────────────┘    └────────────────┘    └────────────┘
//! ```
//!
//! - **[`config`]**: reads `DD_API_KEY`, `DD_APP_KEY`, `API_INTERVAL` and `DD_SITE`
//! - **[`cli`]**: command-line flags for the listener, publish mode and logging
//! - **[`app`]**: starts the snapshot loop and the metrics server and waits for
//!   either to fail or for a shutdown signal
//!
//! Every scrape returns one line per monitor:
//!
//! ```text
//! datadog_monitor_prometheus_exporter_alert_count{name="123",priority="P1",tags="env:prod,team:x"} 1
//! ```
//!
//! ## Usage
//!
//! ```bash
//! DD_API_KEY=... DD_APP_KEY=... API_INTERVAL=60 ddwatch --listen 0.0.0.0:8080
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod duration;
pub mod logging;

pub use app::Settings;
pub use cli::Args;
pub use config::{load_config, Config, ConfigError};
