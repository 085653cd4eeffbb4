//! Companion receiver: accepts ALPR payloads and echoes the simplified
//! records back to the sender.

use anyhow::Context;
use axum::routing::{get, post};
use axum::{Json, Router};
use providers::models::{RecognitionPayload, SimplifiedRecord};
use providers::transform;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

#[derive(Debug, Serialize)]
struct ReceiveResponse {
    ok: bool,
    count: usize,
    plates: Vec<SimplifiedRecord>,
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn receive_alpr(Json(payload): Json<RecognitionPayload>) -> Json<ReceiveResponse> {
    let plates = transform::simplify(&payload, payload.source_file.as_deref());
    info!(count = plates.len(), "received alpr payload");
    Json(ReceiveResponse {
        ok: true,
        count: plates.len(),
        plates,
    })
}

fn app() -> Router {
    Router::new()
        .route("/", get(health))
        .route("/alpr", post(receive_alpr))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let bind = std::env::var("WEBHOOK_BIND").unwrap_or_else(|_| "0.0.0.0:9001".to_string());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    info!(addr = %bind, "webhook receiver listening");
    axum::serve(listener, app()).await.context("serve webhook")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use providers::models::{PlateDetection, ALPR_DATA_TYPE};

    fn payload() -> RecognitionPayload {
        RecognitionPayload {
            version: 2,
            data_type: ALPR_DATA_TYPE.to_string(),
            epoch_time: Some(1_700_000_000_000),
            camera_id: Some(3),
            results: vec![PlateDetection {
                plate: Some("KLM4321".to_string()),
                confidence: Some(88.5),
                region: Some("us-ca".to_string()),
                region_confidence: Some(80.0),
            }],
            source_file: Some("cam3-0012.jpg".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn payloads_are_simplified_and_counted() {
        let Json(resp) = receive_alpr(Json(payload())).await;
        assert!(resp.ok);
        assert_eq!(resp.count, 1);
        assert_eq!(resp.plates[0].plate, "KLM4321");
        assert_eq!(resp.plates[0].state, "CA");
        assert_eq!(resp.plates[0].source_file.as_deref(), Some("cam3-0012.jpg"));
    }

    #[tokio::test]
    async fn foreign_payloads_yield_an_empty_echo() {
        let mut foreign = payload();
        foreign.data_type = "motion_results".to_string();
        let Json(resp) = receive_alpr(Json(foreign)).await;
        assert!(resp.ok);
        assert_eq!(resp.count, 0);
        assert!(resp.plates.is_empty());
    }
}
