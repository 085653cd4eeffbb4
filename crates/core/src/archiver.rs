//! Moves handled frames into the processed area.

use anyhow::Context;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Archives `source` into `processed_dir`, preferring an atomic rename.
/// When rename is unavailable (cross-device moves, bind mounts), the
/// already-read bytes are written to the destination and the source is
/// removed best-effort.
pub fn archive(source: &Path, bytes: &[u8], processed_dir: &Path) -> anyhow::Result<PathBuf> {
    let name = source.file_name().context("frame has no file name")?;
    let target = processed_dir.join(name);
    match fs::rename(source, &target) {
        Ok(()) => Ok(target),
        Err(err) => {
            debug!(file = %target.display(), error = %err, "rename failed, copying instead");
            fs::write(&target, bytes)
                .with_context(|| format!("write archive copy {}", target.display()))?;
            if let Err(err) = fs::remove_file(source) {
                if err.kind() != ErrorKind::NotFound {
                    warn!(file = %source.display(), error = %err, "could not remove source after copy");
                }
            }
            Ok(target)
        }
    }
}
