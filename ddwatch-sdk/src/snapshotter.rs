//! The periodic snapshot loop.

use std::sync::Arc;
use std::time::Duration;

use ddwatch_adapters::MonitorSource;
use ddwatch_types::{MetricSample, MonitorRecord};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::SnapshotError;
use crate::registry::MetricRegistry;

/// Default interval between snapshot cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);

/// How a cycle publishes its samples into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishMode {
    /// Clear the registry, fetch, then set one sample per monitor.
    ///
    /// Scrapes taken while a fetch is in flight see an empty or partially
    /// filled registry.
    #[default]
    ResetThenFill,

    /// Fetch, build the complete sample set, then swap it in.
    ///
    /// Scrapes always see a complete set. A failed fetch leaves the previous
    /// set in place.
    SwapIn,
}

/// Periodically lists monitors from a source and republishes them as
/// presence samples in a [`MetricRegistry`].
///
/// The loop alternates between waiting for the next tick and running one
/// cycle. A cycle that fails ends the loop with the error; nothing is
/// retried.
///
/// # Example
///
/// ```rust,no_run
/// use ddwatch_adapters::datadog::DatadogAdapter;
/// use ddwatch_sdk::Snapshotter;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let adapter = DatadogAdapter::builder()
///         .credentials("api-key", "app-key")
///         .build()?;
///
///     let snapshotter = Snapshotter::builder(adapter)
///         .interval(Duration::from_secs(60))
///         .build();
///
///     let registry = snapshotter.registry();
///     let mut handle = snapshotter.start();
///
///     // ... serve `registry` somewhere ...
///
///     handle.join().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Snapshotter<S> {
    source: S,
    registry: Arc<MetricRegistry>,
    interval: Duration,
    mode: PublishMode,
}

impl<S: MonitorSource + 'static> Snapshotter<S> {
    /// Create a builder for a snapshotter reading from `source`.
    pub fn builder(source: S) -> SnapshotterBuilder<S> {
        SnapshotterBuilder::new(source)
    }

    /// The registry this snapshotter publishes into.
    pub fn registry(&self) -> Arc<MetricRegistry> {
        self.registry.clone()
    }

    /// Interval between cycles.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// How samples are published.
    pub fn mode(&self) -> PublishMode {
        self.mode
    }

    /// Run a single cycle now.
    ///
    /// Returns the number of samples in the registry once the cycle has
    /// published.
    pub async fn run_cycle(&self) -> Result<usize, SnapshotError> {
        let started = Instant::now();

        let monitors = match self.mode {
            PublishMode::ResetThenFill => {
                self.registry.reset();
                let monitors = self.fetch().await?;
                for monitor in &monitors {
                    let sample = MetricSample::presence(monitor);
                    self.registry.set(sample.labels, sample.value);
                }
                monitors
            }
            PublishMode::SwapIn => {
                let monitors = self.fetch().await?;
                self.registry.replace(MetricSample::from_monitors(&monitors));
                monitors
            }
        };

        let samples = self.registry.len();
        let triggered = monitors.iter().filter(|m| m.is_triggered()).count();
        tracing::info!(
            monitors = monitors.len(),
            triggered,
            samples,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "snapshot complete"
        );

        Ok(samples)
    }

    /// Run cycles on the configured interval until `stop` flips to `true`.
    ///
    /// The first cycle runs one full interval after this is called. Ticks
    /// missed while a cycle is still running are dropped, not queued.
    ///
    /// A zero interval, or one too long to schedule, ends the loop with
    /// [`SnapshotError::InvalidInterval`] before any cycle runs.
    pub async fn run(self, mut stop: watch::Receiver<bool>) -> Result<(), SnapshotError> {
        let first_tick = Instant::now()
            .checked_add(self.interval)
            .filter(|_| !self.interval.is_zero())
            .ok_or(SnapshotError::InvalidInterval(self.interval))?;
        let mut ticker = tokio::time::interval_at(first_tick, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            source = %self.source.description(),
            interval_secs = self.interval.as_secs(),
            mode = ?self.mode,
            "snapshot loop started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await?;
                }
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        tracing::info!("snapshot loop stopped");
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Spawn [`run`](Self::run) on the current tokio runtime.
    pub fn start(self) -> SnapshotHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(stop_rx));
        SnapshotHandle { stop_tx, task }
    }

    async fn fetch(&self) -> Result<Vec<MonitorRecord>, SnapshotError> {
        self.source.list_monitors().await.map_err(|e| {
            tracing::error!(error = %e, source = %self.source.description(), "failed to list monitors");
            SnapshotError::SourceUnavailable(e)
        })
    }
}

/// Builder for configuring a Snapshotter.
#[derive(Debug)]
pub struct SnapshotterBuilder<S> {
    source: S,
    registry: Option<Arc<MetricRegistry>>,
    interval: Option<Duration>,
    mode: PublishMode,
}

impl<S: MonitorSource + 'static> SnapshotterBuilder<S> {
    fn new(source: S) -> Self {
        Self {
            source,
            registry: None,
            interval: None,
            mode: PublishMode::default(),
        }
    }

    /// Publish into an existing registry instead of a fresh one.
    pub fn registry(mut self, registry: Arc<MetricRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the cycle interval.
    ///
    /// Defaults to 300 seconds if not specified.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Set how samples are published.
    pub fn mode(mut self, mode: PublishMode) -> Self {
        self.mode = mode;
        self
    }

    /// Build the snapshotter.
    pub fn build(self) -> Snapshotter<S> {
        Snapshotter {
            source: self.source,
            registry: self.registry.unwrap_or_default(),
            interval: self.interval.unwrap_or(DEFAULT_INTERVAL),
            mode: self.mode,
        }
    }
}

/// Handle for controlling a spawned snapshot loop.
#[derive(Debug)]
pub struct SnapshotHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<Result<(), SnapshotError>>,
}

impl SnapshotHandle {
    /// Ask the loop to stop after the current cycle, if any.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Wait for the loop to exit and return its result.
    ///
    /// Must not be awaited again once it has returned.
    pub async fn join(&mut self) -> Result<(), SnapshotError> {
        (&mut self.task)
            .await
            .map_err(|e| SnapshotError::Task(e.to_string()))?
    }
}
