//! Periodic reader - the export scheduler.
//!
//! On a fixed interval, snapshots every instrument of one registry
//! (including invoking gauge callbacks) and hands the resulting batch to
//! the exporter. Ticks never overlap: a tick that is still collecting or
//! exporting when the next timer fires causes the next tick to be skipped
//! entirely, bounding memory and keeping batches in order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::instrument::MeterCore;

use super::batch::{Batch, Resource};
use super::exporter::MetricsExporter;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the periodic reader
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Interval between collection ticks
    pub interval: Duration,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
        }
    }
}

// =============================================================================
// Periodic reader
// =============================================================================

/// Drives the `Idle -> Collecting -> Exporting -> Idle` cycle for one
/// registry.
pub struct PeriodicReader {
    core: Arc<MeterCore>,
    exporter: Arc<dyn MetricsExporter>,
    resource: Resource,
    in_flight: Arc<AtomicBool>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
    shut_down: AtomicBool,
}

impl PeriodicReader {
    /// Start the reader's timer task.
    pub(crate) fn start(
        core: Arc<MeterCore>,
        exporter: Arc<dyn MetricsExporter>,
        resource: Resource,
        config: ReaderConfig,
    ) -> Self {
        let in_flight = Arc::new(AtomicBool::new(false));
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_loop(
            Arc::clone(&core),
            Arc::clone(&exporter),
            resource.clone(),
            config.interval,
            Arc::clone(&in_flight),
            cancel.clone(),
        ));

        Self {
            core,
            exporter,
            resource,
            in_flight,
            cancel,
            task: Mutex::new(Some(task)),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Run one immediate collect-and-export pass.
    ///
    /// Returns `false` if the pass was skipped because another tick was
    /// already in flight.
    pub async fn force_flush(&self) -> bool {
        collect_and_export(
            &self.core,
            self.exporter.as_ref(),
            &self.resource,
            &self.in_flight,
        )
        .await
    }

    /// Stop the timer task and perform one final best-effort flush.
    ///
    /// Idempotent: subsequent calls are no-ops.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }

        self.cancel.cancel();
        let task = self.task.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }

        self.force_flush().await;
        debug!("Periodic reader shut down");
    }
}

impl Drop for PeriodicReader {
    fn drop(&mut self) {
        // The timer task holds no reader reference, so an abandoned reader
        // must not leave it running.
        self.cancel.cancel();
    }
}

async fn run_loop(
    core: Arc<MeterCore>,
    exporter: Arc<dyn MetricsExporter>,
    resource: Resource,
    interval: Duration,
    in_flight: Arc<AtomicBool>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick of a tokio interval fires immediately; consume it so
    // the first export happens one full interval after startup.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Periodic reader stopping");
                break;
            }
            _ = ticker.tick() => {
                collect_and_export(&core, exporter.as_ref(), &resource, &in_flight).await;
            }
        }
    }
}

/// One guarded collection tick. Returns `false` when skipped because a
/// previous tick is still in flight.
#[instrument(skip_all)]
async fn collect_and_export(
    core: &MeterCore,
    exporter: &dyn MetricsExporter,
    resource: &Resource,
    in_flight: &AtomicBool,
) -> bool {
    if in_flight.swap(true, Ordering::SeqCst) {
        debug!("Previous tick still in flight, skipping this tick");
        return false;
    }

    let batch = Batch {
        resource: resource.clone(),
        collected_at: Utc::now(),
        series: core.collect_instant(),
    };

    if batch.is_empty() {
        debug!("No series to export");
    } else if let Err(e) = exporter.export(batch).await {
        // Best-effort delivery: the batch is dropped, never retried or
        // buffered, and the failure is not surfaced into application
        // instruments.
        debug!(error = %e, "Export failed, dropping batch");
    }

    in_flight.store(false, Ordering::SeqCst);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::exporter::InMemoryExporter;
    use crate::export::SeriesValue;
    use crate::instrument::{LabelSet, Meter};
    use async_trait::async_trait;
    use crate::error::Result;

    fn pipeline(config: ReaderConfig) -> (Meter, InMemoryExporter, PeriodicReader) {
        let core = MeterCore::new();
        let meter = Meter::new(Arc::clone(&core));
        let exporter = InMemoryExporter::new();
        let reader = PeriodicReader::start(
            core,
            Arc::new(exporter.clone()),
            Resource::new("test"),
            config,
        );
        (meter, exporter, reader)
    }

    #[tokio::test(start_paused = true)]
    async fn test_reader_exports_on_interval() {
        let (meter, exporter, reader) = pipeline(ReaderConfig::default());
        let counter = meter.create_counter("ticks", "");
        counter.add(1.0, LabelSet::new());

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(exporter.len(), 1);
        let batch = exporter.last().unwrap();
        assert_eq!(batch.series[0].value, SeriesValue::Sum { total: 1.0 });

        reader.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reader_skips_empty_batches() {
        let (_meter, exporter, reader) = pipeline(ReaderConfig::default());

        tokio::time::sleep(Duration::from_millis(3100)).await;

        assert!(exporter.is_empty());
        reader.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_flush_exports_immediately() {
        let (meter, exporter, reader) = pipeline(ReaderConfig {
            interval: Duration::from_secs(3600),
        });
        let counter = meter.create_counter("flushes", "");
        counter.add(2.0, LabelSet::new());

        assert!(reader.force_flush().await);

        assert_eq!(exporter.len(), 1);
        reader.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_is_idempotent_and_flushes() {
        let (meter, exporter, reader) = pipeline(ReaderConfig::default());
        let counter = meter.create_counter("final", "");
        counter.add(1.0, LabelSet::new());

        reader.shutdown().await;
        reader.shutdown().await;

        assert_eq!(exporter.len(), 1);
    }

    /// Exporter that parks until released, simulating a slow transmission.
    struct BlockedExporter {
        release: Arc<tokio::sync::Notify>,
        exported: Arc<AtomicBool>,
    }

    #[async_trait]
    impl MetricsExporter for BlockedExporter {
        async fn export(&self, _batch: Batch) -> Result<()> {
            self.release.notified().await;
            self.exported.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_tick_is_skipped_not_queued() {
        let core = MeterCore::new();
        let meter = Meter::new(Arc::clone(&core));
        let release = Arc::new(tokio::sync::Notify::new());
        let exported = Arc::new(AtomicBool::new(false));
        let exporter = Arc::new(BlockedExporter {
            release: Arc::clone(&release),
            exported: Arc::clone(&exported),
        });
        let reader = Arc::new(PeriodicReader::start(
            core,
            exporter,
            Resource::new("test"),
            ReaderConfig {
                interval: Duration::from_secs(3600),
            },
        ));

        let counter = meter.create_counter("slow", "");
        counter.add(1.0, LabelSet::new());

        // First pass blocks inside the exporter.
        let blocked = {
            let reader = Arc::clone(&reader);
            tokio::spawn(async move { reader.force_flush().await })
        };
        tokio::task::yield_now().await;

        // A tick firing while the first is in flight is skipped entirely.
        assert!(!reader.force_flush().await);
        assert!(!exported.load(Ordering::SeqCst));

        release.notify_one();
        assert!(blocked.await.unwrap());
        assert!(exported.load(Ordering::SeqCst));

        // The shutdown flush goes through the same blocking exporter;
        // store a permit so it can complete.
        release.notify_one();
        reader.shutdown().await;
    }
}
