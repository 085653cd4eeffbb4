//! Forwards the full payload to an HTTP receiver.

use crate::models::{RecognitionPayload, SimplifiedRecord};
use crate::{Sink, SinkError};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const EMIT_TIMEOUT: Duration = Duration::from_secs(15);

pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

#[async_trait::async_trait]
impl Sink for WebhookSink {
    async fn emit(
        &self,
        payload: &RecognitionPayload,
        _records: &[SimplifiedRecord],
        source_file: &str,
    ) -> Result<(), SinkError> {
        let mut annotated = payload.clone();
        annotated.source_file = Some(source_file.to_string());
        let resp = self
            .client
            .post(&self.url)
            .timeout(EMIT_TIMEOUT)
            .json(&annotated)
            .send()
            .await
            .map_err(|e| SinkError::RequestFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| SinkError::RequestFailed(e.to_string()))?;
        debug!(status = %resp.status(), url = %self.url, "payload forwarded");
        Ok(())
    }
}
