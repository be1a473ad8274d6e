//! Telemeter - Client-Side Telemetry Instrumentation & Export Pipeline
//!
//! A telemetry instrumentation layer for long-lived, event-driven host
//! applications such as browser sessions. Counters, histograms, and
//! asynchronously-sampled gauges accumulate measurements from application
//! lifecycle and network events; a periodic scheduler snapshots whatever
//! has accumulated and ships it to a remote collector endpoint.
//!
//! # Architecture
//!
//! ```text
//! Collectors / Request Instrumentation
//!         │ add / record / observe
//!         ▼
//! ┌──────────────┐    ┌──────────────────┐    ┌──────────────┐
//! │    Meter     │───▶│  Periodic Reader │───▶│   Exporter   │
//! │  (registry)  │    │   (scheduler)    │    │    (sink)    │
//! └──────────────┘    └──────────────────┘    └──────────────┘
//!                                                    │
//!                                                    ▼
//!                                            remote collector
//! ```
//!
//! The scheduler snapshots every instrument of one registry at a fixed
//! interval and hands the batch to the exporter; delivery is fire-and-
//! forget (a failed send is logged and dropped, never retried, so a
//! sample can be lost but never shipped twice). Overlapping ticks are
//! skipped, never queued. The lifecycle tracker additionally
//! short-circuits this flow once, synchronously, at the host's
//! termination signal - a best-effort "inactive" sample with no delivery
//! guarantee.
//!
//! # Modules
//!
//! - [`instrument`] - Instruments and the meter registry
//! - [`export`] - Batches, the periodic scheduler, and exporters
//! - [`provider`] - Pipeline wiring and configuration
//! - [`status`] - Lifecycle status tracking and the unload signal
//! - [`http`] - Instrumented outbound requests
//! - [`collectors`] - Visit/vitals/error/dependency collectors
//! - [`diagnostics`] - Explicit warning-sink registration
//! - [`error`] - Error types

pub mod collectors;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod http;
pub mod instrument;
pub mod provider;
pub mod status;

// Re-export commonly used types
pub use collectors::{
    ComponentMetrics, DependencyAudit, ErrorMetrics, WebVitalsCollector,
};
pub use diagnostics::Diagnostics;
pub use error::{Error, Result};
pub use export::{Batch, InMemoryExporter, MetricsExporter};
pub use http::InstrumentedHttp;
pub use instrument::{Counter, Histogram, LabelSet, Meter, ObservableGauge};
pub use provider::{MeterProvider, PipelineConfig};
pub use status::{AppStatusTracker, UnloadEvent, UnloadSignal};
