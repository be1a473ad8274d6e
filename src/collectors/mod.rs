//! Collectors
//!
//! Thin adapters from external event sources into instruments obtained
//! from the registry: page visits and timers, web vitals samples, error
//! and warning occurrences, and the dependency capability audit.

mod component;
mod dependencies;
mod errors;
mod vitals;

pub use component::{ComponentMetrics, MemoryUsageSource, UnavailableMemorySource};
pub use dependencies::{CapabilityProbe, DependencyAudit};
pub use errors::ErrorMetrics;
pub use vitals::{VitalKind, VitalSample, VitalsSource, WebVitalsCollector};
