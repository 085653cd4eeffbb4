//! Append-only NDJSON sink.

use crate::models::{RecognitionPayload, SimplifiedRecord};
use crate::{Sink, SinkError};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait::async_trait]
impl Sink for FileSink {
    async fn emit(
        &self,
        _payload: &RecognitionPayload,
        records: &[SimplifiedRecord],
        _source_file: &str,
    ) -> Result<(), SinkError> {
        if records.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = OpenOptions::new().create(true).append(true).open(&self.path)?;
        for record in records {
            let line = serde_json::to_string(record)?;
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}
