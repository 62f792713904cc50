//! Shared labeled-gauge storage read by the exposition endpoint.

use std::collections::BTreeMap;

use ddwatch_types::{MetricSample, SampleLabels};
use parking_lot::RwLock;

/// Thread-safe collection of gauge samples keyed by their label triple.
///
/// Every individual operation is atomic with respect to readers. A sequence
/// of operations (such as [`reset`](Self::reset) followed by several
/// [`set`](Self::set) calls) is not: a concurrent reader may observe any
/// prefix of it.
#[derive(Debug, Default)]
pub struct MetricRegistry {
    samples: RwLock<BTreeMap<SampleLabels, f64>>,
}

impl MetricRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every sample.
    pub fn reset(&self) {
        self.samples.write().clear();
    }

    /// Insert a sample, overwriting any existing sample with the same labels.
    pub fn set(&self, labels: SampleLabels, value: f64) {
        self.samples.write().insert(labels, value);
    }

    /// Atomically replace the whole sample set.
    ///
    /// The new set is built before the lock is taken, so readers see either
    /// the previous set or the new one, never an empty or partial view.
    pub fn replace(&self, samples: impl IntoIterator<Item = MetricSample>) {
        let next: BTreeMap<SampleLabels, f64> = samples
            .into_iter()
            .map(|s| (s.labels, s.value))
            .collect();
        *self.samples.write() = next;
    }

    /// Current value for a label triple.
    pub fn get(&self, labels: &SampleLabels) -> Option<f64> {
        self.samples.read().get(labels).copied()
    }

    /// Copy of all current samples, ordered by labels.
    pub fn snapshot(&self) -> Vec<MetricSample> {
        self.samples
            .read()
            .iter()
            .map(|(labels, value)| MetricSample::new(labels.clone(), *value))
            .collect()
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.read().len()
    }

    /// Whether the registry holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.read().is_empty()
    }
}
