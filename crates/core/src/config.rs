use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Watched drop folder; frames land here, archives go to `processed/`.
    pub frames_dir: String,
    /// Recognition backend selector: `mock` or `rekor_api`.
    pub backend: String,
    /// Region hint handed to the mock backend, lowercase `cc-ss`.
    pub default_region: String,
    pub camera_id: u32,
    /// Comma-separated filename patterns, matched case-insensitively.
    pub file_glob: String,
    pub debounce_ms: u64,
    pub rescan_seconds: u64,
    /// Sink selector: `file` or `webhook`.
    pub sink: String,
    pub sink_path: String,
    pub webhook_url: String,
    pub rekor_api_url: Option<String>,
    pub rekor_api_key: Option<String>,
    pub rekor_country: String,
    pub rekor_state_hint: Option<String>,
}

impl AppConfig {
    /// `file_glob` split into normalized patterns.
    pub fn patterns(&self) -> Vec<String> {
        self.file_glob
            .split(',')
            .map(|g| g.trim().to_lowercase())
            .filter(|g| !g.is_empty())
            .collect()
    }
}

/// Layers defaults, an optional TOML file and the process environment,
/// in that order. Selector and region values are normalized to lowercase.
pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder()
        .set_default("frames_dir", "/frames")?
        .set_default("backend", "mock")?
        .set_default("default_region", "us-tx")?
        .set_default("camera_id", 1_i64)?
        .set_default("file_glob", "*.jpg,*.jpeg,*.png")?
        .set_default("debounce_ms", 400_i64)?
        .set_default("rescan_seconds", 3_i64)?
        .set_default("sink", "file")?
        .set_default("sink_path", "/frames/results.ndjson")?
        .set_default("webhook_url", "http://webhook:9001/alpr")?
        .set_default("rekor_country", "us")?;
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(config::Environment::default());
    let cfg = settings.build()?;
    let mut cfg: AppConfig = cfg.try_deserialize()?;
    cfg.backend = cfg.backend.to_lowercase();
    cfg.sink = cfg.sink.to_lowercase();
    cfg.default_region = cfg.default_region.to_lowercase();
    Ok(cfg)
}
