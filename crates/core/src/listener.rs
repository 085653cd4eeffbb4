//! Filesystem-event side of file discovery.

use crate::pipeline::PipelineCtx;
use crate::task;
use crate::tracker::{file_name_of, FileIdentity};
use anyhow::Context;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Starts a notify watcher on the frames directory and spawns its event
/// loop. The returned watcher must stay alive for events to keep flowing.
pub fn start(ctx: Arc<PipelineCtx>) -> anyhow::Result<RecommendedWatcher> {
    let (tx, mut rx) = mpsc::channel::<Result<Event, notify::Error>>(100);

    // notify delivers on its own thread; bridge into the runtime.
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = tx.blocking_send(res);
        },
        notify::Config::default().with_poll_interval(Duration::from_secs(2)),
    )
    .context("create filesystem watcher")?;
    watcher
        .watch(&ctx.frames_dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("watch {}", ctx.frames_dir.display()))?;

    tokio::spawn(async move {
        while let Some(res) = rx.recv().await {
            match res {
                Ok(event) => handle_event(&ctx, &event),
                Err(err) => warn!(error = %err, "watch error"),
            }
        }
        debug!("event channel closed");
    });

    Ok(watcher)
}

fn handle_event(ctx: &Arc<PipelineCtx>, event: &Event) {
    if !matches!(event.kind, EventKind::Create(_)) {
        return;
    }
    for path in &event.paths {
        on_created(ctx, path);
    }
}

fn on_created(ctx: &Arc<PipelineCtx>, path: &Path) {
    let name = file_name_of(path);
    if name.is_empty() || !ctx.is_target(&name) {
        return;
    }
    // Advisory skip: the file may still be mid-write, so a failed probe
    // is ignored and the binding dedupe check happens inside the task.
    if let Ok(identity) = FileIdentity::probe(path) {
        if ctx.tracker.is_processed(&identity) {
            return;
        }
    }
    if ctx.tracker.try_start_attempt(&name) {
        task::spawn(ctx.clone(), path.to_path_buf());
    }
}
