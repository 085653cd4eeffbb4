use serde::{Deserialize, Serialize};

/// Wire tag carried by every ALPR payload.
pub const ALPR_DATA_TYPE: &str = "alpr_results";

/// Structured recognition result, wire-compatible with the ALPR webhook
/// convention. Every field is defaulted so the receiver side tolerates
/// sparse payloads from third-party senders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognitionPayload {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub data_type: String,
    #[serde(default)]
    pub img_width: u32,
    #[serde(default)]
    pub img_height: u32,
    /// Capture time, milliseconds since the epoch.
    #[serde(default)]
    pub epoch_time: Option<i64>,
    #[serde(default)]
    pub camera_id: Option<u32>,
    #[serde(default)]
    pub results: Vec<PlateDetection>,
    /// Set by the webhook sink so the receiver can attribute records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlateDetection {
    #[serde(default)]
    pub plate: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Lowercase `cc-ss` region code, e.g. `us-tx`.
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub region_confidence: Option<f64>,
}

/// One row per detection, as written to the NDJSON sink and echoed by the
/// companion receiver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimplifiedRecord {
    pub plate: String,
    pub state: String,
    pub confidence: Option<f64>,
    pub camera_id: Option<u32>,
    pub epoch_time: Option<i64>,
    pub source_file: Option<String>,
}
