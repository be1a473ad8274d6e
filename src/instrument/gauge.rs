//! Asynchronously-sampled gauge instrument.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::labels::LabelSet;

type GaugeCallback = Box<dyn Fn(&mut ObservationSink) + Send + Sync + 'static>;

/// Sink handed to gauge callbacks during a collection pass.
///
/// Each callback reports observations through it; for a given label set the
/// most recently executed callback wins, so a later-registered callback can
/// override an earlier one.
#[derive(Debug, Default)]
pub struct ObservationSink {
    values: BTreeMap<LabelSet, f64>,
}

impl ObservationSink {
    /// Report a value for the unlabeled series.
    pub fn observe(&mut self, value: f64) {
        self.observe_with(value, LabelSet::new());
    }

    /// Report a value for the series identified by `labels`.
    pub fn observe_with(&mut self, value: f64, labels: impl Into<LabelSet>) {
        self.values.insert(labels.into(), value);
    }
}

/// Registered callbacks of an observable gauge.
#[derive(Default)]
pub(crate) struct GaugeState {
    callbacks: RwLock<Vec<GaugeCallback>>,
}

impl GaugeState {
    /// Run every registered callback and capture the resulting
    /// observations, sorted by label set.
    ///
    /// A gauge with no callbacks produces no series.
    pub(crate) fn sample(&self) -> Vec<(LabelSet, f64)> {
        let callbacks = self.callbacks.read();
        if callbacks.is_empty() {
            return Vec::new();
        }

        let mut sink = ObservationSink::default();
        for callback in callbacks.iter() {
            callback(&mut sink);
        }
        sink.values.into_iter().collect()
    }
}

impl std::fmt::Debug for GaugeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GaugeState")
            .field("callbacks", &self.callbacks.read().len())
            .finish()
    }
}

/// An asynchronously-sampled gauge.
///
/// Has no direct `record`; its value is produced only when the export
/// scheduler invokes the registered callbacks during a collection pass.
/// Cheap to clone; all clones share the same callback list.
#[derive(Debug, Clone)]
pub struct ObservableGauge {
    state: Arc<GaugeState>,
}

impl ObservableGauge {
    pub(crate) fn new(state: Arc<GaugeState>) -> Self {
        Self { state }
    }

    /// Register a sampling callback, invoked once per collection pass.
    pub fn add_callback<F>(&self, callback: F)
    where
        F: Fn(&mut ObservationSink) + Send + Sync + 'static,
    {
        self.state.callbacks.write().push(Box::new(callback));
    }
}
