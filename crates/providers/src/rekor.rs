//! Remote recognition over the Rekor cloud ALPR API.

use crate::models::{PlateDetection, RecognitionPayload, ALPR_DATA_TYPE};
use crate::{BackendError, RecognitionBackend};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;

const RECOGNIZE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct RekorApiConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub country: String,
    pub state_hint: Option<String>,
    pub camera_id: u32,
}

pub struct RekorApiBackend {
    client: Client,
    cfg: RekorApiConfig,
}

#[derive(Debug, serde::Deserialize)]
struct RekorResponse {
    #[serde(default)]
    results: Vec<RekorResult>,
    #[serde(default)]
    img_width: u32,
    #[serde(default)]
    img_height: u32,
    #[serde(default)]
    epoch_time: Option<i64>,
    #[serde(default)]
    region_confidence: Option<f64>,
}

#[derive(Debug, serde::Deserialize)]
struct RekorResult {
    #[serde(default)]
    plate: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    region_code: Option<String>,
}

impl RekorApiBackend {
    pub fn new(cfg: RekorApiConfig) -> Self {
        Self {
            client: Client::new(),
            cfg,
        }
    }
}

#[async_trait::async_trait]
impl RecognitionBackend for RekorApiBackend {
    async fn recognize(&self, image: &[u8]) -> Result<RecognitionPayload, BackendError> {
        // Credentials are checked at first use, not at startup: a
        // misconfigured deployment fails loudly on its first frame.
        let url = self
            .cfg
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(BackendError::NotConfigured("REKOR_API_URL"))?;
        let key = self
            .cfg
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(BackendError::NotConfigured("REKOR_API_KEY"))?;

        let image_part = Part::bytes(image.to_vec())
            .file_name("frame.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;
        let mut form = Form::new()
            .text("country", self.cfg.country.clone())
            .part("image", image_part);
        if let Some(state) = self.cfg.state_hint.as_deref().filter(|s| !s.is_empty()) {
            form = form.text("state", state.to_string());
        }

        let resp = self
            .client
            .post(url)
            .header("Authorization", format!("Key {key}"))
            .timeout(RECOGNIZE_TIMEOUT)
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;

        let parsed: RekorResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        let region_confidence = parsed.region_confidence;
        let results: Vec<PlateDetection> = parsed
            .results
            .into_iter()
            .next()
            .and_then(|best| {
                let plate = best.plate.filter(|p| !p.is_empty())?;
                let region = best
                    .region
                    .or(best.region_code)
                    .unwrap_or_else(|| "us-xx".to_string());
                Some(PlateDetection {
                    plate: Some(plate),
                    confidence: best.confidence.or(Some(90.0)),
                    region: Some(region),
                    region_confidence: region_confidence.or(Some(0.0)),
                })
            })
            .into_iter()
            .collect();

        Ok(RecognitionPayload {
            version: 2,
            data_type: ALPR_DATA_TYPE.to_string(),
            img_width: parsed.img_width,
            img_height: parsed.img_height,
            epoch_time: parsed
                .epoch_time
                .or_else(|| Some(chrono::Utc::now().timestamp_millis())),
            camera_id: Some(self.cfg.camera_id),
            results,
            source_file: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RekorApiConfig {
        RekorApiConfig {
            url: None,
            api_key: None,
            country: "us".to_string(),
            state_hint: None,
            camera_id: 1,
        }
    }

    #[tokio::test]
    async fn missing_url_is_a_configuration_error() {
        let backend = RekorApiBackend::new(config());
        let err = backend.recognize(b"bytes").await.unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured("REKOR_API_URL")));
    }

    #[tokio::test]
    async fn missing_key_is_a_configuration_error() {
        let backend = RekorApiBackend::new(RekorApiConfig {
            url: Some("http://localhost:1/v2/recognize".to_string()),
            ..config()
        });
        let err = backend.recognize(b"bytes").await.unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured("REKOR_API_KEY")));
    }

    #[tokio::test]
    async fn empty_credentials_count_as_missing() {
        let backend = RekorApiBackend::new(RekorApiConfig {
            url: Some(String::new()),
            api_key: Some(String::new()),
            ..config()
        });
        let err = backend.recognize(b"bytes").await.unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured(_)));
    }
}
