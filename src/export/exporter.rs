//! Exporter - serializes a batch and ships it to the collector.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::error::{Error, Result};

use super::batch::Batch;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the HTTP exporter
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Collector endpoint URL
    pub endpoint: String,

    /// Transmission timeout
    pub timeout: Duration,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4318/v1/metrics".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

// =============================================================================
// Exporter port
// =============================================================================

/// Port for transmitting a collected batch to a collector.
///
/// The scheduler calls this once per tick and discards any error: delivery
/// is best-effort, loss is acceptable, duplication is not.
#[async_trait]
pub trait MetricsExporter: Send + Sync {
    /// Transmit one batch.
    async fn export(&self, batch: Batch) -> Result<()>;
}

// =============================================================================
// HTTP exporter
// =============================================================================

/// Exports batches as JSON over HTTP POST to a configured endpoint.
pub struct HttpExporter {
    config: ExporterConfig,
    client: Client,
}

impl HttpExporter {
    /// Create a new HTTP exporter.
    pub fn new(config: ExporterConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl MetricsExporter for HttpExporter {
    #[instrument(skip(self, batch), fields(series = batch.len()))]
    async fn export(&self, batch: Batch) -> Result<()> {
        let payload = serde_json::to_vec(&batch)?;

        debug!(
            endpoint = %self.config.endpoint,
            bytes = payload.len(),
            "Exporting batch"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(Error::CollectorConnection)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::CollectorResponse(format!(
                "Export failed with status: {}",
                response.status()
            )))
        }
    }
}

// =============================================================================
// In-memory exporter
// =============================================================================

/// Captures exported batches in memory. Used by tests and local debugging.
#[derive(Debug, Clone, Default)]
pub struct InMemoryExporter {
    batches: Arc<Mutex<Vec<Batch>>>,
}

impl InMemoryExporter {
    /// Create an empty in-memory exporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// All batches exported so far, in export order.
    pub fn batches(&self) -> Vec<Batch> {
        self.batches.lock().clone()
    }

    /// The most recently exported batch, if any.
    pub fn last(&self) -> Option<Batch> {
        self.batches.lock().last().cloned()
    }

    /// Number of batches exported so far.
    pub fn len(&self) -> usize {
        self.batches.lock().len()
    }

    /// True if nothing has been exported yet.
    pub fn is_empty(&self) -> bool {
        self.batches.lock().is_empty()
    }
}

#[async_trait]
impl MetricsExporter for InMemoryExporter {
    async fn export(&self, batch: Batch) -> Result<()> {
        self.batches.lock().push(batch);
        Ok(())
    }
}
