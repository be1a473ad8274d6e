//! Property-Based Tests for Instrument Aggregation
//!
//! Uses proptest to verify the aggregation invariants across arbitrary
//! recording sequences:
//!
//! 1. **Counter summation**: the exported value for a label set equals the
//!    sum of every non-negative amount added to it
//! 2. **Label independence**: series with distinct label sets never
//!    interfere
//! 3. **Histogram completeness**: an export after k records carries
//!    exactly those k observations

#![cfg(test)]

use std::sync::Arc;

use proptest::prelude::*;

use crate::export::batch::SeriesValue;

use super::labels::LabelSet;
use super::meter::{Meter, MeterCore};

fn meter() -> (Meter, Arc<MeterCore>) {
    let core = MeterCore::new();
    (Meter::new(Arc::clone(&core)), core)
}

/// Strategy for non-negative counter increments.
fn amount_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..1000.0, 1..50)
}

/// Strategy for histogram observations, negatives included.
fn observation_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1000.0f64..1000.0, 0..50)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_counter_exports_sum_of_increments(amounts in amount_strategy()) {
        let (meter, core) = meter();
        let counter = meter.create_counter("events", "");

        for amount in &amounts {
            counter.add(*amount, LabelSet::new());
        }

        let series = core.collect_instant();
        let expected: f64 = amounts.iter().sum();
        prop_assert_eq!(series.len(), 1);
        match &series[0].value {
            SeriesValue::Sum { total } => prop_assert!((total - expected).abs() < 1e-6),
            other => prop_assert!(false, "expected sum, got {:?}", other),
        }
    }

    #[test]
    fn prop_label_sets_accumulate_independently(
        home in 1usize..20,
        about in 1usize..20,
    ) {
        let (meter, core) = meter();
        let counter = meter.create_counter("page_visit_counter", "");

        for _ in 0..home {
            counter.add(1.0, LabelSet::from([("page", "home")]));
        }
        for _ in 0..about {
            counter.add(1.0, LabelSet::from([("page", "about")]));
        }

        // Series are sorted by label set: "about" before "home".
        let series = core.collect_instant();
        prop_assert_eq!(series.len(), 2);
        prop_assert_eq!(&series[0].value, &SeriesValue::Sum { total: about as f64 });
        prop_assert_eq!(&series[1].value, &SeriesValue::Sum { total: home as f64 });
    }

    #[test]
    fn prop_histogram_exports_exactly_recorded_observations(
        values in observation_strategy()
    ) {
        let (meter, core) = meter();
        let histogram = meter.create_histogram("latency", "");

        for value in &values {
            histogram.record(*value, LabelSet::new());
        }

        let series = core.collect_instant();
        if values.is_empty() {
            prop_assert!(series.is_empty());
        } else {
            prop_assert_eq!(series.len(), 1);
            prop_assert_eq!(
                &series[0].value,
                &SeriesValue::Observations { values: values.clone() }
            );
        }
    }
}
