use framewatch_core::config::AppConfig;
use framewatch_core::pipeline::PipelineCtx;
use framewatch_core::scanner;
use providers::mock::MockBackend;
use providers::RecognitionBackend;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn test_config(frames_dir: &Path, sink_path: &Path) -> AppConfig {
    AppConfig {
        frames_dir: frames_dir.to_string_lossy().into_owned(),
        backend: "mock".to_string(),
        default_region: "us-tx".to_string(),
        camera_id: 7,
        file_glob: "*.jpg,*.jpeg,*.png".to_string(),
        debounce_ms: 25,
        rescan_seconds: 1,
        sink: "file".to_string(),
        sink_path: sink_path.to_string_lossy().into_owned(),
        webhook_url: "http://localhost:9001/alpr".to_string(),
        rekor_api_url: None,
        rekor_api_key: None,
        rekor_country: "us".to_string(),
        rekor_state_hint: None,
    }
}

async fn wait_for(cond: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    false
}

async fn settle(ctx: &Arc<PipelineCtx>, name: &str) {
    assert!(
        wait_for(|| !ctx.tracker.is_in_progress(name)).await,
        "attempt for {name} did not finish"
    );
}

#[tokio::test]
async fn frame_is_emitted_and_archived() {
    let temp = tempdir().unwrap();
    let frames = temp.path().join("frames");
    let results = temp.path().join("out/results.ndjson");
    let cfg = test_config(&frames, &results);
    let ctx = PipelineCtx::from_config(&cfg).unwrap();

    fs::write(frames.join("car.jpg"), b"fake jpeg bytes").unwrap();
    scanner::scan_once(&ctx).unwrap();

    assert!(wait_for(|| results.exists() && frames.join("processed/car.jpg").exists()).await);
    settle(&ctx, "car.jpg").await;
    assert!(!frames.join("car.jpg").exists());

    let body = fs::read_to_string(&results).unwrap();
    let row: serde_json::Value = serde_json::from_str(body.lines().next().unwrap()).unwrap();
    let expected = MockBackend::new("us-tx".to_string(), 7)
        .recognize(b"fake jpeg bytes")
        .await
        .unwrap();
    assert_eq!(row["plate"], expected.results[0].plate.clone().unwrap());
    assert_eq!(row["state"], "TX");
    assert_eq!(row["camera_id"], 7);
    assert_eq!(row["source_file"], "car.jpg");

    // A later sweep over the emptied directory is a no-op.
    scanner::scan_once(&ctx).unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(fs::read_to_string(&results).unwrap().lines().count(), 1);
}

#[tokio::test]
async fn racing_triggers_emit_exactly_once() {
    let temp = tempdir().unwrap();
    let frames = temp.path().join("frames");
    let results = temp.path().join("out/results.ndjson");
    let cfg = test_config(&frames, &results);
    let ctx = PipelineCtx::from_config(&cfg).unwrap();

    fs::write(frames.join("car.jpg"), b"contested frame").unwrap();

    // Two discovery channels racing on the same file before its debounce
    // elapses: only one attempt may run.
    scanner::scan_once(&ctx).unwrap();
    scanner::scan_once(&ctx).unwrap();

    assert!(wait_for(|| frames.join("processed/car.jpg").exists()).await);
    settle(&ctx, "car.jpg").await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    let body = fs::read_to_string(&results).unwrap();
    assert_eq!(body.lines().count(), 1);
}

#[tokio::test]
async fn failed_backend_leaves_frame_for_the_next_cycle() {
    let temp = tempdir().unwrap();
    let frames = temp.path().join("frames");
    let results = temp.path().join("out/results.ndjson");
    let mut cfg = test_config(&frames, &results);
    // Remote backend with no credentials: every attempt fails loudly.
    cfg.backend = "rekor_api".to_string();
    let ctx = PipelineCtx::from_config(&cfg).unwrap();

    fs::write(frames.join("car.jpg"), b"fake jpeg bytes").unwrap();
    scanner::scan_once(&ctx).unwrap();
    assert!(ctx.tracker.is_in_progress("car.jpg"));
    settle(&ctx, "car.jpg").await;

    // Not archived, not emitted, and the next sweep claims it again.
    assert!(frames.join("car.jpg").exists());
    assert!(!results.exists());
    scanner::scan_once(&ctx).unwrap();
    assert!(ctx.tracker.is_in_progress("car.jpg"));
    settle(&ctx, "car.jpg").await;
    assert!(frames.join("car.jpg").exists());
}

#[tokio::test]
async fn rewritten_frame_is_processed_again() {
    let temp = tempdir().unwrap();
    let frames = temp.path().join("frames");
    let results = temp.path().join("out/results.ndjson");
    let cfg = test_config(&frames, &results);
    let ctx = PipelineCtx::from_config(&cfg).unwrap();

    fs::write(frames.join("gate.jpg"), b"first visit").unwrap();
    scanner::scan_once(&ctx).unwrap();
    assert!(wait_for(|| frames.join("processed/gate.jpg").exists()).await);
    settle(&ctx, "gate.jpg").await;

    // Same name arrives again with new content: a fresh identity.
    fs::write(frames.join("gate.jpg"), b"second visit, longer").unwrap();
    scanner::scan_once(&ctx).unwrap();
    assert!(wait_for(|| fs::read_to_string(&results)
        .map(|body| body.lines().count() == 2)
        .unwrap_or(false))
    .await);
}
