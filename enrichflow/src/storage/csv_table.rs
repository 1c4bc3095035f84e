//! Tabular sink appending rows to a CSV file.

use super::{tabular_row, TabularSink, TABULAR_COLUMNS};
use crate::core::EnrichedContact;
use crate::errors::SinkError;
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

const SINK: &str = "tabular";

/// Appends contacts as CSV rows. The header row is written when the file is new or empty.
#[derive(Debug)]
pub struct CsvTabularSink {
    path: Arc<PathBuf>,
    lock: Mutex<()>,
}

impl CsvTabularSink {
    /// Creates a sink appending to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            lock: Mutex::new(()),
        }
    }

    /// The file this sink appends to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn sink_error(path: &Path, err: impl std::fmt::Display) -> SinkError {
    SinkError::new(SINK, format!("{}: {err}", path.display()))
}

fn append(path: &Path, rows: Vec<Vec<String>>) -> Result<usize, SinkError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| sink_error(path, e))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| sink_error(path, e))?;
    let needs_header = file.metadata().map_err(|e| sink_error(path, e))?.len() == 0;

    let mut writer = csv::Writer::from_writer(file);
    if needs_header {
        writer.write_record(TABULAR_COLUMNS).map_err(|e| sink_error(path, e))?;
    }
    for row in &rows {
        writer.write_record(row).map_err(|e| sink_error(path, e))?;
    }
    writer.flush().map_err(|e| sink_error(path, e))?;
    Ok(rows.len())
}

#[async_trait]
impl TabularSink for CsvTabularSink {
    async fn append_rows(&self, contacts: &[EnrichedContact]) -> Result<usize, SinkError> {
        if contacts.is_empty() {
            return Ok(0);
        }
        let rows: Vec<Vec<String>> = contacts.iter().map(tabular_row).collect();
        let path = Arc::clone(&self.path);

        let _guard = self.lock.lock().await;
        tokio::task::spawn_blocking(move || append(&path, rows))
            .await
            .map_err(|e| SinkError::new(SINK, format!("writer task failed: {e}")))?
    }
}
