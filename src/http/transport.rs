//! Network transport port and its reqwest-backed adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use serde_json::Value;

use crate::error::{Error, Result};

/// HTTP method shapes supported by the transport port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful transport result.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code reported by the transport
    pub status: u16,
    /// Response body, `Null` when empty or not JSON
    pub body: Value,
}

/// Transport failure, carrying the status code when one was observed.
#[derive(Debug, Clone)]
pub struct TransportError {
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    /// The status as a metric label: the code as a string, or `"unknown"`
    /// when the failure carried none.
    pub fn status_label(&self) -> String {
        match self.status {
            Some(code) => code.to_string(),
            None => "unknown".to_string(),
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "HTTP request failed with status {}: {}",
            self.status_label(),
            self.message
        )
    }
}

impl std::error::Error for TransportError {}

/// Port for issuing one outbound network call.
///
/// The caller's logical flow suspends until response or failure; any
/// timeout policy belongs to the implementation.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue one request. `body` is ignored for GET.
    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport adapter.
///
/// Non-success responses are failures carrying the observed status code,
/// and GET requests bypass intermediary caches.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let request = match method {
            Method::Get => self.client.get(url).header(CACHE_CONTROL, "no-cache"),
            Method::Post => {
                let mut request = self.client.post(url);
                if let Some(body) = &body {
                    request = request.json(body);
                }
                request
            }
        };

        let response = request.send().await.map_err(|e| TransportError {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError {
                status: Some(status.as_u16()),
                message: format!("server responded {}", status),
            });
        }

        let code = status.as_u16();
        let body = response.json().await.unwrap_or(Value::Null);
        Ok(TransportResponse { status: code, body })
    }
}
