//! Web vitals collector.
//!
//! One histogram per vitals signal kind, fed by a host-provided
//! performance source delivering `{name, value, rating}` samples.

use crate::instrument::{Histogram, LabelSet, Meter};

/// The five fixed web vitals signal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VitalKind {
    Lcp,
    Inp,
    Cls,
    Ttfb,
    Fcp,
}

impl VitalKind {
    /// All kinds, in the order the dependency audit checks them.
    pub const ALL: [VitalKind; 5] = [
        VitalKind::Lcp,
        VitalKind::Inp,
        VitalKind::Cls,
        VitalKind::Ttfb,
        VitalKind::Fcp,
    ];

    /// Metric name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            VitalKind::Lcp => "lcp",
            VitalKind::Inp => "inp",
            VitalKind::Cls => "cls",
            VitalKind::Ttfb => "ttfb",
            VitalKind::Fcp => "fcp",
        }
    }

    /// Name of the capability hook a component must expose for this kind.
    pub fn hook_name(&self) -> &'static str {
        match self {
            VitalKind::Lcp => "onLCP",
            VitalKind::Inp => "onINP",
            VitalKind::Cls => "onCLS",
            VitalKind::Ttfb => "onTTFB",
            VitalKind::Fcp => "onFCP",
        }
    }
}

impl std::fmt::Display for VitalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One delivered performance sample.
#[derive(Debug, Clone)]
pub struct VitalSample {
    pub name: String,
    pub value: f64,
    pub rating: String,
}

/// Port for the host's performance-observation source.
///
/// Subscribed once per signal kind; the source invokes the handler for
/// every sample it observes of that kind.
pub trait VitalsSource {
    fn subscribe(&self, kind: VitalKind, handler: Box<dyn Fn(VitalSample) + Send + Sync>);
}

/// Records web vitals samples into per-kind histograms.
pub struct WebVitalsCollector {
    lcp: Histogram,
    cls: Histogram,
    fcp: Histogram,
    ttfb: Histogram,
    inp: Histogram,
}

impl WebVitalsCollector {
    /// Create the five vitals histograms on `meter`.
    pub fn new(meter: &Meter) -> Self {
        Self {
            lcp: meter.create_histogram("lcp", "Largest Contentful Paint"),
            cls: meter.create_histogram("cls", "Cumulative Layout Shift"),
            fcp: meter.create_histogram("fcp", "First Contentful Paint"),
            ttfb: meter.create_histogram("ttfb", "Time to First Byte"),
            inp: meter.create_histogram("inp", "Interaction to Next Paint"),
        }
    }

    /// Subscribe to every signal kind on `source`, recording each sample
    /// into the matching histogram with `{name, rating}` labels.
    pub fn start_collection(&self, source: &dyn VitalsSource) {
        for kind in VitalKind::ALL {
            let histogram = self.histogram_for(kind).clone();
            source.subscribe(
                kind,
                Box::new(move |sample| {
                    histogram.record(
                        sample.value,
                        LabelSet::from([
                            ("name", sample.name.as_str()),
                            ("rating", sample.rating.as_str()),
                        ]),
                    );
                }),
            );
        }
    }

    fn histogram_for(&self, kind: VitalKind) -> &Histogram {
        match kind {
            VitalKind::Lcp => &self.lcp,
            VitalKind::Cls => &self.cls,
            VitalKind::Fcp => &self.fcp,
            VitalKind::Ttfb => &self.ttfb,
            VitalKind::Inp => &self.inp,
        }
    }
}
