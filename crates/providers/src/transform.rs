//! Pure projection from ALPR payloads to simplified plate records.

use crate::models::{RecognitionPayload, SimplifiedRecord, ALPR_DATA_TYPE};

/// One record per detection that carries both a plate and a region;
/// detections missing either are dropped, as is any payload that does not
/// declare the ALPR data type.
pub fn simplify(payload: &RecognitionPayload, source_file: Option<&str>) -> Vec<SimplifiedRecord> {
    if payload.data_type != ALPR_DATA_TYPE {
        return Vec::new();
    }
    payload
        .results
        .iter()
        .filter_map(|det| {
            let plate = det.plate.as_deref().filter(|p| !p.is_empty())?;
            let region = det.region.as_deref().filter(|r| !r.is_empty())?;
            Some(SimplifiedRecord {
                plate: plate.to_string(),
                state: state_of(region),
                confidence: det.confidence,
                camera_id: payload.camera_id,
                epoch_time: payload.epoch_time,
                source_file: source_file.map(str::to_string),
            })
        })
        .collect()
}

/// `us-tx` -> `TX`; a region without a separator is uppercased whole.
fn state_of(region: &str) -> String {
    region
        .rsplit_once('-')
        .map(|(_, suffix)| suffix)
        .unwrap_or(region)
        .to_uppercase()
}
