//! Diagnostic sink registration.
//!
//! Every warning emitted anywhere in the process must increment a warning
//! counter. Instead of overriding a shared global logging function,
//! components route their warnings through an explicit [`Diagnostics`]
//! hub; the error collector registers itself as the hub's sink at startup.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

/// Receiver of routed warnings.
pub trait DiagnosticSink: Send + Sync {
    /// Called once per warning routed through the hub.
    fn on_warning(&self, message: &str);
}

/// Explicit registration point for a process-wide warning sink.
///
/// Warnings routed through the hub reach the registered sink, which is
/// responsible for surfacing them on the standard diagnostic channel;
/// without a sink the hub logs them itself. Warnings are never
/// suppressed either way.
#[derive(Default)]
pub struct Diagnostics {
    sink: RwLock<Option<Arc<dyn DiagnosticSink>>>,
}

impl Diagnostics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register the sink receiving every routed warning. A later
    /// registration replaces an earlier one.
    pub fn register_sink(&self, sink: Arc<dyn DiagnosticSink>) {
        *self.sink.write() = Some(sink);
    }

    /// Route one warning.
    pub fn warn(&self, message: &str) {
        let sink = self.sink.read().clone();
        match sink {
            Some(sink) => sink.on_warning(message),
            None => warn!("{message}"),
        }
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("sink_registered", &self.sink.read().is_some())
            .finish()
    }
}
