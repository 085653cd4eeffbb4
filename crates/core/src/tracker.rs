//! Shared dedupe and in-flight state for processing attempts.

use std::collections::HashSet;
use std::fs::Metadata;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::UNIX_EPOCH;

/// Identity of one observed file content: same name, size and mtime
/// (millisecond precision) means "already handled". A rewrite under the
/// same name produces a fresh identity and is eligible for reprocessing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    name: String,
    size: u64,
    mtime_ms: i64,
}

impl FileIdentity {
    /// Stats `path` and derives its identity. Fails when the file is gone
    /// or its metadata is unreadable; callers treat that as "skip".
    pub fn probe(path: &Path) -> std::io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        Self::from_metadata(&file_name_of(path), &meta)
    }

    pub fn from_metadata(name: &str, meta: &Metadata) -> std::io::Result<Self> {
        let mtime_ms = meta
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Ok(Self {
            name: name.to_string(),
            size: meta.len(),
            mtime_ms,
        })
    }
}

/// Bare file name used as the per-attempt ownership key.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Default)]
struct TrackerState {
    in_progress: HashSet<String>,
    processed: HashSet<FileIdentity>,
}

/// Serializes every membership decision behind one lock so check-and-set
/// is a single critical section. Injected into the listener, the scanner
/// and every attempt task.
#[derive(Default)]
pub struct FileTracker {
    state: Mutex<TrackerState>,
}

impl FileTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `name` for a new attempt. Returns false when a task already
    /// owns it; the caller must not start work in that case.
    pub fn try_start_attempt(&self, name: &str) -> bool {
        self.lock().in_progress.insert(name.to_string())
    }

    /// Releases `name`. Idempotent; runs on every attempt exit path.
    pub fn finish_attempt(&self, name: &str) {
        self.lock().in_progress.remove(name);
    }

    /// Read-only pre-check used by the scanner; the binding reservation
    /// still goes through `try_start_attempt`.
    pub fn is_in_progress(&self, name: &str) -> bool {
        self.lock().in_progress.contains(name)
    }

    pub fn is_processed(&self, identity: &FileIdentity) -> bool {
        self.lock().processed.contains(identity)
    }

    /// Never pruned; the set lives for the process lifetime.
    pub fn mark_processed(&self, identity: FileIdentity) {
        self.lock().processed.insert(identity);
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        // A panicked attempt must not wedge the whole coordinator.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
