//! Error types for the telemetry pipeline

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the telemetry pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Collector connection error
    #[error("Collector connection error: {0}")]
    CollectorConnection(#[source] reqwest::Error),

    /// Collector rejected the exported batch
    #[error("Collector rejected batch: {0}")]
    CollectorResponse(String),

    /// Batch serialization error
    #[error("Failed to serialize batch: {0}")]
    BatchSerialize(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
