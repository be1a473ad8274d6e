//! Dependency capability audit.

use tracing::error;

use crate::instrument::{LabelSet, Meter};

use super::vitals::VitalKind;

/// Port for a capability-bearing component: any object optionally
/// exposing the five vitals hook slots. A missing slot is not an error,
/// only a reportable condition.
pub trait CapabilityProbe {
    fn has_hook(&self, hook: VitalKind) -> bool;
}

/// Checks a component for the expected vitals hooks, reporting each
/// missing one as an issue string and a labeled counter increment.
pub struct DependencyAudit {
    meter: Meter,
}

impl DependencyAudit {
    pub fn new(meter: Meter) -> Self {
        Self { meter }
    }

    /// Audit `component` under the default metric name.
    pub fn verify_and_handle_dependencies(&self, component: &dyn CapabilityProbe) -> Vec<String> {
        self.verify_with_metric(
            component,
            "dependency_issues",
            "Number of dependency issues detected",
        )
    }

    /// Audit `component`, reporting issues under `metric_name`.
    ///
    /// The counter is created inside the call, so repeated audits create
    /// duplicate instruments under the same name; the registry accepts
    /// that by design.
    pub fn verify_with_metric(
        &self,
        component: &dyn CapabilityProbe,
        metric_name: &str,
        description: &str,
    ) -> Vec<String> {
        let counter = self.meter.create_counter(metric_name, description);

        let issues: Vec<String> = VitalKind::ALL
            .iter()
            .filter(|kind| !component.has_hook(**kind))
            .map(|kind| {
                format!(
                    "{} is not imported or used in the component",
                    kind.hook_name()
                )
            })
            .collect();

        for issue in &issues {
            error!("Dependency issue detected: {issue}");
            counter.add(1.0, LabelSet::from([("issue", issue.as_str())]));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::SeriesValue;
    use crate::instrument::MeterCore;
    use std::sync::Arc;

    /// Component exposing only the listed hooks.
    struct HooksPresent(&'static [VitalKind]);

    impl CapabilityProbe for HooksPresent {
        fn has_hook(&self, hook: VitalKind) -> bool {
            self.0.contains(&hook)
        }
    }

    fn audit() -> (Arc<MeterCore>, DependencyAudit) {
        let core = MeterCore::new();
        let meter = Meter::new(Arc::clone(&core));
        (core, DependencyAudit::new(meter))
    }

    #[test]
    fn test_only_lcp_present_reports_four_issues() {
        let (core, audit) = audit();
        let component = HooksPresent(&[VitalKind::Lcp]);

        let issues = audit.verify_and_handle_dependencies(&component);

        assert_eq!(issues.len(), 4);
        assert_eq!(
            issues,
            vec![
                "onINP is not imported or used in the component",
                "onCLS is not imported or used in the component",
                "onTTFB is not imported or used in the component",
                "onFCP is not imported or used in the component",
            ]
        );

        // Four increments, each under a distinct issue label.
        let series = core.collect_instant();
        assert_eq!(series.len(), 4);
        assert!(series.iter().all(|s| s.name == "dependency_issues"));
        assert!(series
            .iter()
            .all(|s| s.value == SeriesValue::Sum { total: 1.0 }));
        let labels: std::collections::HashSet<_> = series
            .iter()
            .map(|s| s.labels.get("issue").unwrap().to_string())
            .collect();
        assert_eq!(labels.len(), 4);
    }

    #[test]
    fn test_all_hooks_present_reports_nothing() {
        let (core, audit) = audit();
        let component = HooksPresent(&VitalKind::ALL);

        let issues = audit.verify_and_handle_dependencies(&component);

        assert!(issues.is_empty());
        assert!(core.collect_instant().is_empty());
    }

    #[test]
    fn test_no_hooks_present_reports_all_five() {
        let (core, audit) = audit();
        let component = HooksPresent(&[]);

        let issues = audit.verify_and_handle_dependencies(&component);

        assert_eq!(issues.len(), 5);
        assert_eq!(core.collect_instant().len(), 5);
    }

    #[test]
    fn test_repeated_audits_create_duplicate_counters() {
        let (core, audit) = audit();
        let component = HooksPresent(&[]);

        audit.verify_and_handle_dependencies(&component);
        audit.verify_and_handle_dependencies(&component);

        // Two audits, two independent counters under the same name: ten
        // series in total.
        assert_eq!(core.collect_instant().len(), 10);
    }
}
