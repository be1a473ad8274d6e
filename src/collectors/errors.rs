//! Error and warning collector.

use std::sync::Arc;

use tracing::{error, warn};

use crate::diagnostics::{DiagnosticSink, Diagnostics};
use crate::instrument::{Counter, LabelSet, Meter};

/// Counts intercepted errors and warnings, always surfacing them on the
/// standard diagnostic channel. Never suppresses anything.
pub struct ErrorMetrics {
    error_counter: Counter,
    warning_counter: Counter,
}

impl ErrorMetrics {
    /// Create the error/warning counters on `meter`.
    pub fn new(meter: &Meter) -> Self {
        Self {
            error_counter: meter
                .create_counter("error_count", "Number of errors in the application"),
            warning_counter: meter
                .create_counter("warning_count", "Number of warnings in the application"),
        }
    }

    /// Create the collector and register it as the hub's warning sink, so
    /// every warning routed through `diagnostics` is counted.
    pub fn install(meter: &Meter, diagnostics: &Diagnostics) -> Arc<Self> {
        let collector = Arc::new(Self::new(meter));
        diagnostics.register_sink(Arc::clone(&collector) as Arc<dyn DiagnosticSink>);
        collector
    }

    /// Count an error, labeled by its type name, and surface it.
    pub fn handle_error<E: std::error::Error>(&self, err: &E) {
        let name = short_type_name::<E>();
        self.error_counter
            .add(1.0, LabelSet::from([("error", name)]));
        error!(error = %err, "An error occurred: {name}");
    }

    /// Count a warning, labeled by its message, and surface it.
    pub fn handle_warning(&self, message: &str) {
        let label = if message.is_empty() {
            "UnknownWarning"
        } else {
            message
        };
        self.warning_counter
            .add(1.0, LabelSet::from([("warning", label)]));
        warn!("Warning detected: {message}");
    }
}

impl DiagnosticSink for ErrorMetrics {
    fn on_warning(&self, message: &str) {
        self.handle_warning(message);
    }
}

/// Last path segment of a type name, the closest analog to a runtime
/// error's name.
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
