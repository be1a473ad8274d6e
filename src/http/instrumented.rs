//! Transport wrapper recording duration and status metrics per call.

use std::time::Instant;

use serde_json::Value;

use crate::instrument::{Counter, Histogram, LabelSet, Meter};

use super::transport::{HttpTransport, Method, TransportError, TransportResponse};

/// Wraps an [`HttpTransport`], recording one duration observation and one
/// status-labeled count for every completed call and one status-labeled
/// count for every failed call.
///
/// Failures are re-raised verbatim: the caller's business logic sees
/// exactly what the transport produced.
pub struct InstrumentedHttp<T: HttpTransport> {
    transport: T,
    request_histogram: Histogram,
    request_counter: Counter,
}

impl<T: HttpTransport> InstrumentedHttp<T> {
    /// Instrument `transport` with metrics from `meter`.
    pub fn new(meter: &Meter, transport: T) -> Self {
        let request_histogram = meter.create_histogram(
            "http_request_duration_seconds",
            "Measures the duration of HTTP requests in seconds",
        );
        let request_counter = meter.create_counter(
            "http_request_status_count",
            "Counts the number of HTTP requests by status code",
        );

        Self {
            transport,
            request_histogram,
            request_counter,
        }
    }

    /// Issue an instrumented GET request.
    pub async fn get(
        &self,
        url: &str,
    ) -> std::result::Result<TransportResponse, TransportError> {
        self.dispatch(Method::Get, url, None).await
    }

    /// Issue an instrumented POST request.
    pub async fn post(
        &self,
        url: &str,
        body: Value,
    ) -> std::result::Result<TransportResponse, TransportError> {
        self.dispatch(Method::Post, url, Some(body)).await
    }

    async fn dispatch(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let start = Instant::now();

        match self.transport.request(method, url, body).await {
            Ok(response) => {
                let elapsed = start.elapsed().as_secs_f64();
                // Successful calls are labeled with the literal status
                // "200", whatever status the transport actually reported.
                let labels = LabelSet::from([
                    ("method", method.as_str()),
                    ("status", "200"),
                    ("url", url),
                ]);
                self.request_histogram.record(elapsed, labels.clone());
                self.request_counter.add(1.0, labels);
                Ok(response)
            }
            Err(error) => {
                // Duration is not recorded for failed calls.
                let status = error.status_label();
                self.request_counter.add(
                    1.0,
                    LabelSet::from([
                        ("method", method.as_str()),
                        ("status", status.as_str()),
                        ("url", url),
                    ]),
                );
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::SeriesValue;
    use crate::instrument::{InstrumentKind, MeterCore};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Transport stub returning a scripted outcome per call.
    struct ScriptedTransport {
        outcome: std::result::Result<u16, TransportError>,
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn request(
            &self,
            _method: Method,
            _url: &str,
            _body: Option<Value>,
        ) -> std::result::Result<TransportResponse, TransportError> {
            match &self.outcome {
                Ok(status) => Ok(TransportResponse {
                    status: *status,
                    body: Value::Null,
                }),
                Err(e) => Err(e.clone()),
            }
        }
    }

    fn instrumented(
        outcome: std::result::Result<u16, TransportError>,
    ) -> (Arc<MeterCore>, InstrumentedHttp<ScriptedTransport>) {
        let core = MeterCore::new();
        let meter = Meter::new(Arc::clone(&core));
        let http = InstrumentedHttp::new(&meter, ScriptedTransport { outcome });
        (core, http)
    }

    #[tokio::test]
    async fn test_successful_get_records_duration_and_count() {
        let (core, http) = instrumented(Ok(200));

        let response = http.get("http://api.example/items").await.unwrap();
        assert_eq!(response.status, 200);

        let series = core.collect_instant();
        let expected_labels = LabelSet::from([
            ("method", "GET"),
            ("status", "200"),
            ("url", "http://api.example/items"),
        ]);

        let histogram = series
            .iter()
            .find(|s| s.kind == InstrumentKind::Histogram)
            .unwrap();
        assert_eq!(histogram.name, "http_request_duration_seconds");
        assert_eq!(histogram.labels, expected_labels);
        assert_matches::assert_matches!(
            &histogram.value,
            SeriesValue::Observations { values } if values.len() == 1
        );

        let counter = series
            .iter()
            .find(|s| s.kind == InstrumentKind::Counter)
            .unwrap();
        assert_eq!(counter.name, "http_request_status_count");
        assert_eq!(counter.labels, expected_labels);
        assert_eq!(counter.value, SeriesValue::Sum { total: 1.0 });
    }

    #[tokio::test]
    async fn test_success_always_reports_literal_200() {
        // The transport reports 204, but the success path labels the
        // series "200" regardless. Preserved observed behavior.
        let (core, http) = instrumented(Ok(204));

        let response = http.get("http://api.example/items").await.unwrap();
        assert_eq!(response.status, 204);

        let series = core.collect_instant();
        assert!(series.iter().all(|s| s.labels.get("status") == Some("200")));
    }

    #[tokio::test]
    async fn test_failed_get_counts_status_and_reraises() {
        let (core, http) = instrumented(Err(TransportError {
            status: Some(404),
            message: "not found".into(),
        }));

        let error = http.get("http://api.example/items").await.unwrap_err();
        assert_eq!(error.status, Some(404));
        assert_eq!(error.message, "not found");

        let series = core.collect_instant();
        // Counter incremented with the failure status; duration histogram
        // untouched.
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, "http_request_status_count");
        assert_eq!(
            series[0].labels,
            LabelSet::from([
                ("method", "GET"),
                ("status", "404"),
                ("url", "http://api.example/items"),
            ])
        );
        assert_eq!(series[0].value, SeriesValue::Sum { total: 1.0 });
    }

    #[tokio::test]
    async fn test_failure_without_status_labels_unknown() {
        let (core, http) = instrumented(Err(TransportError {
            status: None,
            message: "connection reset".into(),
        }));

        let _ = http.post("http://api.example/items", Value::Null).await;

        let series = core.collect_instant();
        assert_eq!(series[0].labels.get("status"), Some("unknown"));
        assert_eq!(series[0].labels.get("method"), Some("POST"));
    }
}
