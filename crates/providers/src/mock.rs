//! Offline backend that derives a deterministic plate from frame content.

use crate::models::{PlateDetection, RecognitionPayload, ALPR_DATA_TYPE};
use crate::{BackendError, RecognitionBackend};

pub struct MockBackend {
    default_region: String,
    camera_id: u32,
}

impl MockBackend {
    pub fn new(default_region: String, camera_id: u32) -> Self {
        Self {
            default_region,
            camera_id,
        }
    }

    /// Three letters + four digits pulled from the content hash, so the
    /// same bytes always read as the same plate.
    fn plate_for(image: &[u8]) -> String {
        let hex = blake3::hash(image).to_hex().as_str().to_uppercase();
        let letters: String = hex.chars().filter(char::is_ascii_alphabetic).take(3).collect();
        let digits: String = hex.chars().filter(char::is_ascii_digit).take(4).collect();
        format!(
            "{}{}",
            if letters.is_empty() { "ABC".to_string() } else { letters },
            if digits.is_empty() { "1234".to_string() } else { digits },
        )
    }

    /// Stable stand-in for a model score, kept in the 85..95 band.
    fn confidence_for(image: &[u8]) -> f64 {
        let byte = blake3::hash(image).as_bytes()[0] as f64;
        ((85.0 + byte * 10.0 / 255.0) * 100.0).round() / 100.0
    }
}

#[async_trait::async_trait]
impl RecognitionBackend for MockBackend {
    async fn recognize(&self, image: &[u8]) -> Result<RecognitionPayload, BackendError> {
        Ok(RecognitionPayload {
            version: 2,
            data_type: ALPR_DATA_TYPE.to_string(),
            img_width: 0,
            img_height: 0,
            epoch_time: Some(chrono::Utc::now().timestamp_millis()),
            camera_id: Some(self.camera_id),
            results: vec![PlateDetection {
                plate: Some(Self::plate_for(image)),
                confidence: Some(Self::confidence_for(image)),
                region: Some(self.default_region.clone()),
                region_confidence: Some(80.0),
            }],
            source_file: None,
        })
    }
}
