//! Pluggable recognition backends and result sinks.

use crate::models::{RecognitionPayload, SimplifiedRecord};
use thiserror::Error;

pub mod file;
pub mod mock;
pub mod models;
pub mod rekor;
pub mod transform;
pub mod webhook;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend not configured: {0} is missing")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("request failed: {0}")]
    RequestFailed(String),
}

/// Turns raw frame bytes into a structured ALPR payload. Implementations
/// are called concurrently from many attempt tasks.
#[async_trait::async_trait]
pub trait RecognitionBackend: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<RecognitionPayload, BackendError>;
}

/// Durable or forwarded destination for one attempt's results. `records`
/// is the simplified projection of `payload`; sinks pick whichever form
/// their wire contract wants.
#[async_trait::async_trait]
pub trait Sink: Send + Sync {
    async fn emit(
        &self,
        payload: &RecognitionPayload,
        records: &[SimplifiedRecord],
        source_file: &str,
    ) -> Result<(), SinkError>;
}
