//! Periodic reconciliation sweep over the frames directory.
//!
//! Notification channels can drop or coalesce events, and files may
//! already be waiting when the process starts; the sweep guarantees every
//! lingering file eventually gets a processing attempt.

use crate::pipeline::PipelineCtx;
use crate::task;
use crate::tracker::{file_name_of, FileIdentity};
use anyhow::Context;
use std::fs;
use std::sync::Arc;
use tracing::warn;

/// Runs forever on the configured interval. The first tick fires
/// immediately, which doubles as the startup sweep.
pub async fn run(ctx: Arc<PipelineCtx>) {
    let mut tick = tokio::time::interval(ctx.rescan);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tick.tick().await;
        if let Err(err) = scan_once(&ctx) {
            warn!(error = %err, "rescan cycle failed");
        }
    }
}

/// One sweep. Per-entry failures skip that entry; only a failure to list
/// the directory aborts the cycle (and the next interval retries).
pub fn scan_once(ctx: &Arc<PipelineCtx>) -> anyhow::Result<()> {
    let entries = fs::read_dir(&ctx.frames_dir)
        .with_context(|| format!("list {}", ctx.frames_dir.display()))?;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => continue,
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = file_name_of(&path);
        if !ctx.is_target(&name) {
            continue;
        }
        if ctx.tracker.is_in_progress(&name) {
            continue;
        }
        // Entry may vanish mid-sweep; skip it and let a later cycle look
        // again.
        let identity = match FileIdentity::probe(&path) {
            Ok(identity) => identity,
            Err(_) => continue,
        };
        if ctx.tracker.is_processed(&identity) {
            continue;
        }
        if ctx.tracker.try_start_attempt(&name) {
            task::spawn(ctx.clone(), path);
        }
    }
    Ok(())
}
