//! Document sink writing one JSON document per line.

use super::{document, DocumentSink};
use crate::core::EnrichedContact;
use crate::errors::SinkError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const SINK: &str = "document";

/// Appends contacts to a JSON-lines file.
///
/// Each batch is written with a single append, so concurrent batches never
/// interleave within a line.
#[derive(Debug)]
pub struct JsonLinesDocumentSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLinesDocumentSink {
    /// Creates a sink appending to `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The file this sink appends to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DocumentSink for JsonLinesDocumentSink {
    async fn write_batch(&self, contacts: &[EnrichedContact]) -> Result<usize, SinkError> {
        if contacts.is_empty() {
            return Ok(0);
        }
        let mut buf = Vec::new();
        for contact in contacts {
            serde_json::to_writer(&mut buf, &document(contact))
                .map_err(|e| SinkError::new(SINK, e.to_string()))?;
            buf.push(b'\n');
        }

        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SinkError::new(SINK, e.to_string()))?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| SinkError::new(SINK, format!("{}: {e}", self.path.display())))?;
        file.write_all(&buf)
            .await
            .map_err(|e| SinkError::new(SINK, e.to_string()))?;
        file.flush().await.map_err(|e| SinkError::new(SINK, e.to_string()))?;
        Ok(contacts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CandidateContact, CompanySeed, ProviderId};
    use crate::utils::now_utc;

    fn contact(email: &str) -> EnrichedContact {
        let candidate =
            CandidateContact::new(ProviderId::Lusha, &CompanySeed::new("Acme", "acme.com")).with_email(email);
        EnrichedContact::unverified(candidate).stored(now_utc())
    }

    #[tokio::test]
    async fn test_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("contacts.jsonl");
        let sink = JsonLinesDocumentSink::new(&path);

        assert_eq!(sink.write_batch(&[contact("a@acme.com")]).await.unwrap(), 1);
        assert_eq!(
            sink.write_batch(&[contact("b@acme.com"), contact("c@acme.com")]).await.unwrap(),
            2
        );

        let text = std::fs::read_to_string(&path).unwrap();
        let docs: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[2]["email"], "c@acme.com");
        assert_ne!(docs[0]["_id"], docs[1]["_id"]);
        assert!(docs[0]["stored_at"].is_string());
    }

    #[tokio::test]
    async fn test_empty_batch_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.jsonl");
        let sink = JsonLinesDocumentSink::new(&path);

        assert_eq!(sink.write_batch(&[]).await.unwrap(), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let sink = JsonLinesDocumentSink::new(dir.path());
        let err = sink.write_batch(&[contact("a@acme.com")]).await.unwrap_err();
        assert_eq!(err.sink, "document");
    }
}
