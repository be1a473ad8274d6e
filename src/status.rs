//! Lifecycle status tracker.
//!
//! Reports whether the host process is currently active through an
//! observable gauge: `1` on every collection tick while running, forced to
//! `0` exactly once when the host's termination signal fires. The host
//! provides no guaranteed execution window after that signal, so delivery
//! of the final `0` sample is best-effort only - it reaches the collector
//! only if one more collection tick happens to run before the process is
//! destroyed. Nothing correctness-critical may depend on it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::instrument::{Meter, ObservableGauge};

/// Interval of the operational heartbeat log line.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

// =============================================================================
// Unload signal
// =============================================================================

type UnloadHandler = Box<dyn Fn(&UnloadEvent) + Send + Sync + 'static>;

/// One dispatch of the termination signal, handed to every handler.
///
/// Mirrors a cancellable host event: a handler may ask the host to hold
/// its default teardown. The host is free to ignore the request.
#[derive(Debug, Default)]
pub struct UnloadEvent {
    prevent: AtomicBool,
}

impl UnloadEvent {
    /// Ask the host to suppress its default teardown action.
    pub fn prevent_default(&self) {
        self.prevent.store(true, Ordering::SeqCst);
    }

    /// True once any handler has called
    /// [`prevent_default`](Self::prevent_default).
    pub fn default_prevented(&self) -> bool {
        self.prevent.load(Ordering::SeqCst)
    }
}

/// Subscription handle returned by [`UnloadSignal::subscribe`].
#[derive(Debug)]
pub struct UnloadSubscription(u64);

/// The host's single synchronous "about to terminate" hook.
///
/// The embedding application calls [`fire`](UnloadSignal::fire) from its
/// termination callback (the browser-style `beforeunload` moment); every
/// subscribed handler runs synchronously, once. Handlers get no promise of
/// further execution time beyond that call.
#[derive(Default)]
pub struct UnloadSignal {
    handlers: Mutex<Vec<(u64, UnloadHandler)>>,
    next_id: AtomicU64,
    fired: AtomicBool,
}

impl UnloadSignal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a synchronous termination handler.
    pub fn subscribe<F>(&self, handler: F) -> UnloadSubscription
    where
        F: Fn(&UnloadEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.handlers.lock().push((id, Box::new(handler)));
        UnloadSubscription(id)
    }

    /// Remove a previously registered handler. Safe to call after the
    /// signal has fired or for an already-removed subscription.
    pub fn unsubscribe(&self, subscription: UnloadSubscription) {
        self.handlers.lock().retain(|(id, _)| *id != subscription.0);
    }

    /// Run every handler, synchronously and exactly once; subsequent fires
    /// are no-ops. Returns `true` if any handler asked the host to hold
    /// its default teardown via [`UnloadEvent::prevent_default`].
    pub fn fire(&self) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }
        let handlers = std::mem::take(&mut *self.handlers.lock());
        let event = UnloadEvent::default();
        for (_, handler) in &handlers {
            handler(&event);
        }
        event.default_prevented()
    }

    /// True once [`fire`](UnloadSignal::fire) has run.
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for UnloadSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnloadSignal")
            .field("handlers", &self.handlers.lock().len())
            .field("fired", &self.has_fired())
            .finish()
    }
}

// =============================================================================
// App status tracker
// =============================================================================

/// Drives the application liveness gauge and heartbeat.
pub struct AppStatusTracker {
    meter: Meter,
    signal: Arc<UnloadSignal>,
    gauge: Arc<Mutex<Option<ObservableGauge>>>,
    heartbeat: Mutex<Option<JoinHandle<()>>>,
    subscription: Mutex<Option<UnloadSubscription>>,
}

impl AppStatusTracker {
    /// Create a tracker wired to the host's termination signal.
    pub fn new(meter: Meter, signal: Arc<UnloadSignal>) -> Self {
        let gauge = Arc::new(Mutex::new(None::<ObservableGauge>));

        let slot = Arc::clone(&gauge);
        let subscription = signal.subscribe(move |event: &UnloadEvent| {
            info!("Termination signal received, reporting status 0 before shutdown");
            // Appending a 0-reporting callback overrides the 1-reporting
            // one for the next collection tick, if any tick still runs.
            if let Some(gauge) = slot.lock().as_ref() {
                gauge.add_callback(|sink| sink.observe(0.0));
            }
            // Holding the host's default teardown is the only window in
            // which a final collection tick can still run.
            event.prevent_default();
        });

        Self {
            meter,
            signal,
            gauge,
            heartbeat: Mutex::new(None),
            subscription: Mutex::new(Some(subscription)),
        }
    }

    /// Start reporting the liveness gauge under `name` and log a heartbeat
    /// line every 15 seconds.
    ///
    /// The heartbeat is purely an operational signal; it feeds no
    /// instrument.
    pub fn start_tracking_status(&self, name: &str, description: &str) {
        let gauge = self.meter.create_observable_gauge(name, description);
        gauge.add_callback(|sink| sink.observe(1.0));
        *self.gauge.lock() = Some(gauge);

        let metric_name = name.to_string();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                info!(metric = %metric_name, "Application active, status metric reporting");
            }
        });

        if let Some(previous) = self.heartbeat.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Release the heartbeat task and the termination-signal subscription.
    /// Idempotent.
    pub fn dispose(&self) {
        if let Some(heartbeat) = self.heartbeat.lock().take() {
            heartbeat.abort();
        }
        if let Some(subscription) = self.subscription.lock().take() {
            self.signal.unsubscribe(subscription);
        }
        debug!("App status tracker disposed");
    }
}
