//! Monotonic counter instrument.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::warn;

use super::labels::LabelSet;

/// Accumulated per-series state of a counter.
#[derive(Debug, Default)]
pub(crate) struct CounterState {
    series: DashMap<LabelSet, f64>,
}

impl CounterState {
    /// Read the current sum of every series, sorted by label set.
    ///
    /// Sums are cumulative: totals since instrument creation, never reset
    /// by a collection pass.
    pub(crate) fn snapshot(&self) -> Vec<(LabelSet, f64)> {
        let mut out: Vec<_> = self
            .series
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

/// A monotonically-increasing counter.
///
/// Cheap to clone; all clones share the same accumulated state.
#[derive(Debug, Clone)]
pub struct Counter {
    state: Arc<CounterState>,
}

impl Counter {
    pub(crate) fn new(state: Arc<CounterState>) -> Self {
        Self { state }
    }

    /// Add a non-negative amount to the series identified by `labels`.
    ///
    /// Negative and non-finite amounts would break monotonicity and are
    /// dropped with a warning.
    pub fn add(&self, amount: f64, labels: impl Into<LabelSet>) {
        if !amount.is_finite() || amount < 0.0 {
            warn!(amount, "Dropping non-finite or negative counter increment");
            return;
        }
        *self.state.series.entry(labels.into()).or_insert(0.0) += amount;
    }
}
