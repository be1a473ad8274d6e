//! Instrument registry
//!
//! Defines the three instrument kinds (Counter, Histogram, ObservableGauge)
//! and the [`Meter`] registry that creates and owns them. Each instrument is
//! partitioned into independent series by [`LabelSet`]; the registry holds
//! every instrument as a tagged variant so a caller can only ever invoke the
//! operations its kind supports.

mod counter;
mod gauge;
mod histogram;
mod labels;
mod meter;

#[cfg(test)]
mod proptest;

pub use counter::Counter;
pub use gauge::{ObservableGauge, ObservationSink};
pub use histogram::Histogram;
pub use labels::LabelSet;
pub use meter::{InstrumentKind, Meter};

pub(crate) use meter::MeterCore;
