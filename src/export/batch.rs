//! Batch snapshot types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::instrument::{InstrumentKind, LabelSet};

/// Attributes identifying the entity producing the telemetry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    attributes: BTreeMap<String, String>,
}

impl Resource {
    /// Create a resource carrying a `service.name` attribute.
    pub fn new(service_name: impl Into<String>) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert("service.name".to_string(), service_name.into());
        Self { attributes }
    }

    /// Builder-style insertion of an extra attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Value carried by one series in a batch, tagged by instrument kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesValue {
    /// Cumulative counter total since instrument creation.
    Sum { total: f64 },
    /// Raw histogram observations since the previous export.
    Observations { values: Vec<f64> },
    /// Latest sampled gauge value for this collection pass.
    Gauge { value: f64 },
}

/// The accumulated state of one instrument for one distinct label set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesData {
    pub name: String,
    pub kind: InstrumentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub labels: LabelSet,
    pub value: SeriesValue,
}

/// An immutable snapshot of all series across all instruments of one
/// registry, taken at one collection instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Batch {
    pub resource: Resource,
    pub collected_at: DateTime<Utc>,
    pub series: Vec<SeriesData>,
}

impl Batch {
    /// True if the snapshot carries no series.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Number of series in the snapshot.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Series exported under `name`.
    pub fn series_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SeriesData> + 'a {
        self.series.iter().filter(move |s| s.name == name)
    }
}
