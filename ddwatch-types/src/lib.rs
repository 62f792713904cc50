//! # ddwatch-types
//!
//! Core types shared by the ddwatch crates: the monitor records fetched from
//! Datadog and the labeled metric samples derived from them.
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `serde`: Serialization of monitor records via serde
//!
//! ## Example
//!
//! ```rust
//! use ddwatch_types::{MetricSample, MonitorRecord, MonitorState, Priority};
//!
//! let monitor = MonitorRecord::builder(42)
//!     .name("High error rate")
//!     .priority(Priority::P1)
//!     .state(MonitorState::Alert)
//!     .tag("env:prod")
//!     .tag("team:payments")
//!     .build();
//!
//! let sample = MetricSample::presence(&monitor);
//! assert_eq!(sample.labels.name, "42");
//! assert_eq!(sample.labels.priority, "P1");
//! assert_eq!(sample.labels.tags, "env:prod,team:payments");
//! assert_eq!(sample.value, 1.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod monitor;
mod sample;

pub use monitor::*;
pub use sample::*;
