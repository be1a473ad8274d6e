//! Histogram instrument recording raw observations.

use std::sync::Arc;

use dashmap::DashMap;

use super::labels::LabelSet;

/// Per-series observations accumulated since the last collection pass.
#[derive(Debug, Default)]
pub(crate) struct HistogramState {
    series: DashMap<LabelSet, Vec<f64>>,
}

impl HistogramState {
    /// Take every observation recorded since the previous drain, sorted by
    /// label set.
    ///
    /// Histograms carry delta semantics: a batch holds exactly the values
    /// recorded since the last export, and draining resets the window.
    pub(crate) fn drain(&self) -> Vec<(LabelSet, Vec<f64>)> {
        let mut out = Vec::new();
        for mut entry in self.series.iter_mut() {
            if entry.value().is_empty() {
                continue;
            }
            out.push((entry.key().clone(), std::mem::take(entry.value_mut())));
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

/// A histogram of recorded numeric observations.
///
/// Cheap to clone; all clones share the same accumulated state.
#[derive(Debug, Clone)]
pub struct Histogram {
    state: Arc<HistogramState>,
}

impl Histogram {
    pub(crate) fn new(state: Arc<HistogramState>) -> Self {
        Self { state }
    }

    /// Record one observation into the series identified by `labels`.
    pub fn record(&self, value: f64, labels: impl Into<LabelSet>) {
        self.state
            .series
            .entry(labels.into())
            .or_default()
            .push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram() -> (Histogram, Arc<HistogramState>) {
        let state = Arc::new(HistogramState::default());
        (Histogram::new(Arc::clone(&state)), state)
    }

    #[test]
    fn test_histogram_collects_every_observation() {
        let (histogram, state) = histogram();
        let labels = LabelSet::from([("component", "current-component")]);

        histogram.record(1.0, labels.clone());
        histogram.record(2.0, labels.clone());
        histogram.record(2.0, labels.clone());

        let drained = state.drain();
        assert_eq!(drained, vec![(labels, vec![1.0, 2.0, 2.0])]);
    }

    #[test]
    fn test_histogram_label_sets_are_independent() {
        let (histogram, state) = histogram();

        histogram.record(10.0, LabelSet::from([("name", "lcp")]));
        histogram.record(0.1, LabelSet::from([("name", "cls")]));

        let drained = state.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], (LabelSet::from([("name", "cls")]), vec![0.1]));
        assert_eq!(drained[1], (LabelSet::from([("name", "lcp")]), vec![10.0]));
    }

    #[test]
    fn test_histogram_drain_resets_window() {
        let (histogram, state) = histogram();
        let labels = LabelSet::new();

        histogram.record(1.0, labels.clone());
        assert_eq!(state.drain().len(), 1);

        // Nothing recorded since the drain: no series.
        assert!(state.drain().is_empty());

        histogram.record(2.0, labels.clone());
        assert_eq!(state.drain(), vec![(labels, vec![2.0])]);
    }
}
