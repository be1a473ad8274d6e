//! Component metrics collector: visits, session/render timers, memory.

use std::sync::Arc;
use std::time::Instant;

use crate::diagnostics::Diagnostics;
use crate::instrument::{Counter, Histogram, LabelSet, Meter};

/// Port for the host's current-memory-usage figure.
pub trait MemoryUsageSource: Send + Sync {
    /// Current heap usage in MB, or `None` when the host cannot report it.
    fn used_heap_mb(&self) -> Option<f64>;
}

/// Source for hosts without a memory-usage facility.
#[derive(Debug, Default)]
pub struct UnavailableMemorySource;

impl MemoryUsageSource for UnavailableMemorySource {
    fn used_heap_mb(&self) -> Option<f64> {
        None
    }
}

/// Tracks page visits, user-session and render durations, and memory
/// usage for the current component.
///
/// Each `track_*` operation requires its `configure_*` to have run first;
/// tracking an unconfigured instrument routes a warning through the
/// diagnostics hub and is otherwise a no-op.
pub struct ComponentMetrics {
    meter: Meter,
    diagnostics: Arc<Diagnostics>,
    memory_source: Arc<dyn MemoryUsageSource>,
    visit_counter: Option<Counter>,
    render_histogram: Option<Histogram>,
    session_histogram: Option<Histogram>,
    memory_histogram: Option<Histogram>,
    session_start: Option<Instant>,
    render_start: Option<Instant>,
}

impl ComponentMetrics {
    pub fn new(meter: Meter, diagnostics: Arc<Diagnostics>) -> Self {
        Self {
            meter,
            diagnostics,
            memory_source: Arc::new(UnavailableMemorySource),
            visit_counter: None,
            render_histogram: None,
            session_histogram: None,
            memory_histogram: None,
            session_start: None,
            render_start: None,
        }
    }

    /// Use a host-provided memory figure instead of the unavailable
    /// default.
    pub fn with_memory_source(mut self, source: Arc<dyn MemoryUsageSource>) -> Self {
        self.memory_source = source;
        self
    }

    // =========================================================================
    // Visits
    // =========================================================================

    /// Configure the visit counter under its default name.
    pub fn configure_visit_counter(&mut self) {
        self.configure_visit_counter_as("page_visit_counter", "Number of page visits");
    }

    /// Configure the visit counter under a custom name.
    pub fn configure_visit_counter_as(&mut self, name: &str, description: &str) {
        self.visit_counter = Some(self.meter.create_counter(name, description));
    }

    /// Count one visit of the named page or component.
    pub fn track_visit(&self, component_name: &str) {
        match &self.visit_counter {
            Some(counter) => counter.add(1.0, LabelSet::from([("page", component_name)])),
            None => self.diagnostics.warn("Visit counter not configured."),
        }
    }

    // =========================================================================
    // Session duration
    // =========================================================================

    /// Create (or replace) the session-duration histogram under a custom
    /// name and unit. Ending a session creates it on first use under the
    /// default name.
    pub fn configure_session_duration_histogram(
        &mut self,
        name: &str,
        description: &str,
        unit: &str,
    ) {
        self.session_histogram =
            Some(self.meter.create_histogram_with_unit(name, description, unit));
    }

    /// Capture the session start timestamp.
    pub fn start_session(&mut self) {
        self.session_start = Some(Instant::now());
    }

    /// End the session and record its duration under the default name.
    pub fn end_session(&mut self) {
        self.end_session_as("session_duration_histogram", "Duration of user session");
    }

    /// End the session and record its duration in seconds. The histogram
    /// is created on the first end and reused afterwards.
    pub fn end_session_as(&mut self, name: &str, description: &str) {
        let Some(start) = self.session_start else {
            self.diagnostics.warn("Session has not been started.");
            return;
        };
        let duration = start.elapsed().as_secs_f64();
        if self.session_histogram.is_none() {
            self.configure_session_duration_histogram(name, description, "s");
        }
        self.track_session_duration(duration);
    }

    /// Record a session duration in seconds into the configured histogram.
    pub fn track_session_duration(&self, duration: f64) {
        match &self.session_histogram {
            Some(histogram) => {
                histogram.record(duration, LabelSet::from([("user", "current-user")]))
            }
            None => self
                .diagnostics
                .warn("Session duration histogram not configured."),
        }
    }

    // =========================================================================
    // Render time
    // =========================================================================

    /// Create (or replace) the render-time histogram under a custom name
    /// and unit. Ending a render creates it on first use under the default
    /// name.
    pub fn configure_render_time_histogram(&mut self, name: &str, description: &str, unit: &str) {
        self.render_histogram =
            Some(self.meter.create_histogram_with_unit(name, description, unit));
    }

    /// Capture the render start timestamp.
    pub fn start_render(&mut self) {
        self.render_start = Some(Instant::now());
    }

    /// End the render and record its duration under the default name.
    pub fn end_render(&mut self) {
        self.end_render_as("render_time_histogram", "Render time of component");
    }

    /// End the render and record its duration in milliseconds. The
    /// histogram is created on the first end and reused afterwards.
    pub fn end_render_as(&mut self, name: &str, description: &str) {
        let Some(start) = self.render_start else {
            self.diagnostics.warn("Render time has not been started.");
            return;
        };
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        if self.render_histogram.is_none() {
            self.configure_render_time_histogram(name, description, "ms");
        }
        self.track_render_time(duration_ms);
    }

    /// Record a render duration in milliseconds into the configured
    /// histogram.
    pub fn track_render_time(&self, duration_ms: f64) {
        match &self.render_histogram {
            Some(histogram) => histogram.record(
                duration_ms,
                LabelSet::from([("component", "current-component")]),
            ),
            None => self
                .diagnostics
                .warn("Render time histogram not configured."),
        }
    }

    // =========================================================================
    // Memory usage
    // =========================================================================

    /// Configure the memory-usage histogram under its default name.
    pub fn configure_memory_usage(&mut self) {
        self.configure_memory_usage_as(
            "memory_usage_histogram",
            "Memory usage of component in MB",
        );
    }

    /// Configure the memory-usage histogram under a custom name.
    pub fn configure_memory_usage_as(&mut self, name: &str, description: &str) {
        self.memory_histogram =
            Some(self.meter.create_histogram_with_unit(name, description, "MB"));
    }

    /// Record the host's current memory usage; 0 when unavailable.
    pub fn track_memory_usage(&self) {
        match &self.memory_histogram {
            Some(histogram) => {
                let usage_mb = self.memory_source.used_heap_mb().unwrap_or(0.0);
                histogram.record(
                    usage_mb,
                    LabelSet::from([("component", "current-component")]),
                );
            }
            None => self
                .diagnostics
                .warn("Memory usage histogram not configured."),
        }
    }
}
