//! Meter provider - wires the registry, scheduler, and exporter together.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::error::Result;
use crate::export::{
    ExporterConfig, HttpExporter, MetricsExporter, PeriodicReader, ReaderConfig, Resource,
};
use crate::instrument::{Meter, MeterCore};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for one exporting pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Collector endpoint URL
    pub endpoint: String,

    /// Interval between collection ticks
    pub export_interval: Duration,

    /// Transmission timeout per export
    pub export_timeout: Duration,

    /// Value of the `service.name` resource attribute
    pub service_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4318/v1/metrics".to_string(),
            export_interval: Duration::from_millis(1000),
            export_timeout: Duration::from_secs(10),
            service_name: "web-client".to_string(),
        }
    }
}

// =============================================================================
// Meter provider
// =============================================================================

/// Owns one instrument registry and its periodic export pipeline.
///
/// Independent providers run independent pipelines with no ordering
/// guarantees relative to each other; a low-frequency provider (say a
/// 15 s interval for lifecycle signals) can coexist with the main 1 s
/// application provider.
pub struct MeterProvider {
    core: Arc<MeterCore>,
    reader: PeriodicReader,
}

impl MeterProvider {
    /// Create a provider exporting over HTTP per `config`.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let exporter = HttpExporter::new(ExporterConfig {
            endpoint: config.endpoint.clone(),
            timeout: config.export_timeout,
        })?;
        Ok(Self::with_exporter(Arc::new(exporter), config))
    }

    /// Create a provider with a caller-supplied exporter.
    pub fn with_exporter(exporter: Arc<dyn MetricsExporter>, config: PipelineConfig) -> Self {
        info!(
            endpoint = %config.endpoint,
            interval_ms = config.export_interval.as_millis() as u64,
            service = %config.service_name,
            "Starting metrics pipeline"
        );

        let core = MeterCore::new();
        let reader = PeriodicReader::start(
            Arc::clone(&core),
            exporter,
            Resource::new(config.service_name),
            ReaderConfig {
                interval: config.export_interval,
            },
        );

        Self { core, reader }
    }

    /// Hand out an instrument registry handle scoped to this pipeline.
    pub fn meter(&self) -> Meter {
        Meter::new(Arc::clone(&self.core))
    }

    /// Run one immediate collect-and-export pass.
    ///
    /// Returns `false` if a tick was already in flight.
    pub async fn force_flush(&self) -> bool {
        self.reader.force_flush().await
    }

    /// Stop the pipeline with one final best-effort flush. Idempotent.
    pub async fn shutdown(&self) {
        self.reader.shutdown().await;
    }
}
