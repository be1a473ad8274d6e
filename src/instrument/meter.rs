//! Meter - the instrument registry.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::export::batch::{SeriesData, SeriesValue};

use super::counter::{Counter, CounterState};
use super::gauge::{GaugeState, ObservableGauge};
use super::histogram::{Histogram, HistogramState};

// =============================================================================
// Instrument metadata
// =============================================================================

/// Kind of instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    Counter,
    Histogram,
    ObservableGauge,
}

impl std::fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrumentKind::Counter => write!(f, "counter"),
            InstrumentKind::Histogram => write!(f, "histogram"),
            InstrumentKind::ObservableGauge => write!(f, "observable_gauge"),
        }
    }
}

/// Static identity of one registered instrument.
#[derive(Debug, Clone)]
struct Descriptor {
    name: String,
    #[allow(dead_code)]
    description: String,
    unit: Option<String>,
}

/// Tagged instrument state: the registry can only hand out the operations
/// the kind supports.
enum InstrumentCell {
    Counter(Arc<CounterState>),
    Histogram(Arc<HistogramState>),
    Gauge(Arc<GaugeState>),
}

struct InstrumentEntry {
    descriptor: Descriptor,
    cell: InstrumentCell,
}

// =============================================================================
// Meter core
// =============================================================================

/// Shared registry state: every instrument created through a [`Meter`],
/// in registration order.
pub(crate) struct MeterCore {
    instruments: RwLock<Vec<InstrumentEntry>>,
}

impl MeterCore {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            instruments: RwLock::new(Vec::new()),
        })
    }

    fn register(&self, descriptor: Descriptor, cell: InstrumentCell) {
        self.instruments
            .write()
            .push(InstrumentEntry { descriptor, cell });
    }

    /// Snapshot every series of every instrument at one logical instant.
    ///
    /// Counters report cumulative sums, histograms drain the observations
    /// recorded since the previous pass, and gauges run their callbacks
    /// synchronously within the pass. Instruments appear in registration
    /// order; series within an instrument are sorted by label set.
    pub(crate) fn collect_instant(&self) -> Vec<SeriesData> {
        let instruments = self.instruments.read();
        let mut series = Vec::new();

        for entry in instruments.iter() {
            let descriptor = &entry.descriptor;
            match &entry.cell {
                InstrumentCell::Counter(state) => {
                    for (labels, total) in state.snapshot() {
                        series.push(SeriesData {
                            name: descriptor.name.clone(),
                            kind: InstrumentKind::Counter,
                            unit: descriptor.unit.clone(),
                            labels,
                            value: SeriesValue::Sum { total },
                        });
                    }
                }
                InstrumentCell::Histogram(state) => {
                    for (labels, values) in state.drain() {
                        series.push(SeriesData {
                            name: descriptor.name.clone(),
                            kind: InstrumentKind::Histogram,
                            unit: descriptor.unit.clone(),
                            labels,
                            value: SeriesValue::Observations { values },
                        });
                    }
                }
                InstrumentCell::Gauge(state) => {
                    for (labels, value) in state.sample() {
                        series.push(SeriesData {
                            name: descriptor.name.clone(),
                            kind: InstrumentKind::ObservableGauge,
                            unit: descriptor.unit.clone(),
                            labels,
                            value: SeriesValue::Gauge { value },
                        });
                    }
                }
            }
        }

        series
    }
}

// =============================================================================
// Meter
// =============================================================================

/// Creates and owns instruments scoped to one exporting pipeline.
///
/// Instrument names are not validated or deduplicated: repeated calls with
/// the same name create independent instrument handles that export under
/// that name, and an empty name is accepted. Callers are expected to cache
/// the handles they create.
#[derive(Clone)]
pub struct Meter {
    core: Arc<MeterCore>,
}

impl Meter {
    pub(crate) fn new(core: Arc<MeterCore>) -> Self {
        Self { core }
    }

    /// Create a monotonic counter.
    pub fn create_counter(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Counter {
        let state = Arc::new(CounterState::default());
        self.core.register(
            Descriptor {
                name: name.into(),
                description: description.into(),
                unit: None,
            },
            InstrumentCell::Counter(Arc::clone(&state)),
        );
        Counter::new(state)
    }

    /// Create a histogram of raw observations.
    pub fn create_histogram(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Histogram {
        self.histogram(name.into(), description.into(), None)
    }

    /// Create a histogram annotated with a unit (e.g. `"s"`, `"ms"`, `"MB"`).
    pub fn create_histogram_with_unit(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
    ) -> Histogram {
        self.histogram(name.into(), description.into(), Some(unit.into()))
    }

    fn histogram(&self, name: String, description: String, unit: Option<String>) -> Histogram {
        let state = Arc::new(HistogramState::default());
        self.core.register(
            Descriptor {
                name,
                description,
                unit,
            },
            InstrumentCell::Histogram(Arc::clone(&state)),
        );
        Histogram::new(state)
    }

    /// Create an observable gauge, sampled via its callbacks on every
    /// collection pass.
    pub fn create_observable_gauge(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> ObservableGauge {
        let state = Arc::new(GaugeState::default());
        self.core.register(
            Descriptor {
                name: name.into(),
                description: description.into(),
                unit: None,
            },
            InstrumentCell::Gauge(Arc::clone(&state)),
        );
        ObservableGauge::new(state)
    }
}

impl std::fmt::Debug for Meter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Meter")
            .field("instruments", &self.core.instruments.read().len())
            .finish()
    }
}
