//! Export pipeline
//!
//! Periodic collection of instrument state into immutable [`Batch`]
//! snapshots and best-effort transmission to a remote collector endpoint.

pub mod batch;
mod exporter;
mod reader;

pub use batch::{Batch, Resource, SeriesData, SeriesValue};
pub use exporter::{ExporterConfig, HttpExporter, InMemoryExporter, MetricsExporter};

pub(crate) use reader::{PeriodicReader, ReaderConfig};
