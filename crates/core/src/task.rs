//! One processing attempt: debounce, read, recognize, emit, archive.

use crate::archiver;
use crate::pipeline::PipelineCtx;
use crate::tracker::{file_name_of, FileIdentity};
use anyhow::Context;
use providers::transform;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Releases the in-progress claim when the attempt ends, on every path
/// out of the task including panics.
struct AttemptGuard {
    ctx: Arc<PipelineCtx>,
    name: String,
}

impl Drop for AttemptGuard {
    fn drop(&mut self) {
        self.ctx.tracker.finish_attempt(&self.name);
    }
}

/// Fire-and-forget attempt for `path`. The caller must have claimed the
/// file name through `FileTracker::try_start_attempt` first.
pub fn spawn(ctx: Arc<PipelineCtx>, path: PathBuf) -> JoinHandle<()> {
    tokio::spawn(async move {
        let name = file_name_of(&path);
        let _release = AttemptGuard {
            ctx: ctx.clone(),
            name: name.clone(),
        };
        if let Err(err) = process(&ctx, &path, &name).await {
            warn!(file = %name, error = %err, "attempt failed");
        }
    })
}

async fn process(ctx: &PipelineCtx, path: &Path, name: &str) -> anyhow::Result<()> {
    // Let a slowly-written file finish landing before touching it.
    tokio::time::sleep(ctx.debounce).await;

    let meta = match tokio::fs::metadata(path).await {
        Ok(meta) => meta,
        // Removed while we debounced; not an error.
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err).context("stat frame"),
    };
    let identity = FileIdentity::from_metadata(name, &meta).context("frame identity")?;
    if ctx.tracker.is_processed(&identity) {
        return Ok(());
    }

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        // Vanished between the existence check and the read.
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err).context("read frame"),
    };

    let payload = ctx
        .backend
        .recognize(&bytes)
        .await
        .context("recognition backend")?;
    let records = transform::simplify(&payload, Some(name));
    ctx.sink.emit(&payload, &records, name).await.context("sink emit")?;
    info!(file = %name, plates = records.len(), "frame emitted");

    ctx.tracker.mark_processed(identity);

    if let Err(err) = archiver::archive(path, &bytes, &ctx.processed_dir) {
        // Emission already succeeded; losing the move is a cleanup miss.
        warn!(file = %name, error = %err, "archive failed");
    }
    Ok(())
}
