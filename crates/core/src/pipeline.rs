//! Wires configuration into a running watch pipeline.

use crate::config::AppConfig;
use crate::listener;
use crate::scanner;
use crate::tracker::FileTracker;
use anyhow::{bail, Context};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use providers::file::FileSink;
use providers::mock::MockBackend;
use providers::rekor::{RekorApiBackend, RekorApiConfig};
use providers::webhook::WebhookSink;
use providers::{RecognitionBackend, Sink};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared context handed to the listener, the scanner and every attempt
/// task. Both discovery channels gate through the same tracker.
pub struct PipelineCtx {
    pub frames_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub patterns: GlobSet,
    pub debounce: Duration,
    pub rescan: Duration,
    pub tracker: FileTracker,
    pub backend: Arc<dyn RecognitionBackend>,
    pub sink: Arc<dyn Sink>,
}

impl PipelineCtx {
    /// Builds the context and creates the watched and processed
    /// directories. Unknown backend/sink selectors fail here.
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Arc<Self>> {
        let frames_dir = PathBuf::from(&cfg.frames_dir);
        let processed_dir = frames_dir.join("processed");
        fs::create_dir_all(&frames_dir)
            .with_context(|| format!("create frames dir {}", frames_dir.display()))?;
        fs::create_dir_all(&processed_dir)
            .with_context(|| format!("create processed dir {}", processed_dir.display()))?;

        Ok(Arc::new(Self {
            frames_dir,
            processed_dir,
            patterns: build_globset(&cfg.patterns())?,
            debounce: Duration::from_millis(cfg.debounce_ms),
            rescan: Duration::from_secs(cfg.rescan_seconds.max(1)),
            tracker: FileTracker::new(),
            backend: build_backend(cfg)?,
            sink: build_sink(cfg)?,
        }))
    }

    /// True when `name` is on the configured allowlist.
    pub fn is_target(&self, name: &str) -> bool {
        self.patterns.is_match(name)
    }
}

pub fn build_backend(cfg: &AppConfig) -> anyhow::Result<Arc<dyn RecognitionBackend>> {
    match cfg.backend.as_str() {
        "mock" => Ok(Arc::new(MockBackend::new(
            cfg.default_region.clone(),
            cfg.camera_id,
        ))),
        "rekor_api" => Ok(Arc::new(RekorApiBackend::new(RekorApiConfig {
            url: cfg.rekor_api_url.clone(),
            api_key: cfg.rekor_api_key.clone(),
            country: cfg.rekor_country.clone(),
            state_hint: cfg.rekor_state_hint.clone(),
            camera_id: cfg.camera_id,
        }))),
        other => bail!("unknown backend: {other}"),
    }
}

pub fn build_sink(cfg: &AppConfig) -> anyhow::Result<Arc<dyn Sink>> {
    match cfg.sink.as_str() {
        "file" => Ok(Arc::new(FileSink::new(PathBuf::from(&cfg.sink_path)))),
        "webhook" => Ok(Arc::new(WebhookSink::new(cfg.webhook_url.clone()))),
        other => bail!("unknown sink: {other}"),
    }
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat).case_insensitive(true).build()?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Runs the listener and scanner until Ctrl-C. In-flight attempts are
/// abandoned on shutdown; coordinator state is process-local anyway.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let ctx = PipelineCtx::from_config(&cfg)?;
    info!(
        dir = %ctx.frames_dir.display(),
        backend = %cfg.backend,
        sink = %cfg.sink,
        patterns = %cfg.file_glob,
        "watching frames directory"
    );

    let _watcher = listener::start(ctx.clone())?;
    let scan = tokio::spawn(scanner::run(ctx.clone()));

    tokio::signal::ctrl_c().await.context("wait for shutdown signal")?;
    info!("shutting down");
    scan.abort();
    Ok(())
}
