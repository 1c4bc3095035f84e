//! In-memory collaborators for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;

use crate::core::{CompanySeed, EnrichedContact};
use crate::errors::{SinkError, SourceError};
use crate::storage::{tabular_row, CompanySource, DocumentSink, TabularSink};

/// A company source returning a fixed list, or a fixed error.
#[derive(Debug, Clone)]
pub struct MemoryCompanySource {
    result: Result<Vec<CompanySeed>, SourceError>,
}

impl MemoryCompanySource {
    /// Creates a source returning `seeds`.
    #[must_use]
    pub fn new(seeds: Vec<CompanySeed>) -> Self {
        Self { result: Ok(seeds) }
    }

    /// Creates a source whose load always fails.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Err(SourceError(message.into())),
        }
    }
}

#[async_trait]
impl CompanySource for MemoryCompanySource {
    async fn load(&self) -> Result<Vec<CompanySeed>, SourceError> {
        self.result.clone()
    }
}

/// A document sink keeping every stored contact in memory.
///
/// Batches for domains registered with [`MemoryDocumentSink::fail_for`] are rejected.
#[derive(Debug, Default)]
pub struct MemoryDocumentSink {
    stored: Mutex<Vec<EnrichedContact>>,
    batches: Mutex<usize>,
    failing_domains: HashSet<String>,
}

impl MemoryDocumentSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects batches containing contacts for `domain`.
    #[must_use]
    pub fn fail_for(mut self, domain: &str) -> Self {
        self.failing_domains.insert(domain.to_lowercase());
        self
    }

    /// Every stored contact, in write order.
    #[must_use]
    pub fn contacts(&self) -> Vec<EnrichedContact> {
        self.stored.lock().clone()
    }

    /// Number of stored contacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stored.lock().len()
    }

    /// Returns true if nothing was stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stored.lock().is_empty()
    }

    /// Number of write calls received, including rejected ones.
    #[must_use]
    pub fn batch_count(&self) -> usize {
        *self.batches.lock()
    }
}

#[async_trait]
impl DocumentSink for MemoryDocumentSink {
    async fn write_batch(&self, contacts: &[EnrichedContact]) -> Result<usize, SinkError> {
        *self.batches.lock() += 1;
        if let Some(c) = contacts.iter().find(|c| self.failing_domains.contains(&c.domain)) {
            return Err(SinkError::new("document", format!("rejected batch for {}", c.domain)));
        }
        self.stored.lock().extend_from_slice(contacts);
        Ok(contacts.len())
    }
}

/// A tabular sink keeping every row in memory.
#[derive(Debug, Default)]
pub struct MemoryTabularSink {
    rows: Mutex<Vec<Vec<String>>>,
    failing_domains: HashSet<String>,
}

impl MemoryTabularSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects batches containing contacts for `domain`.
    #[must_use]
    pub fn fail_for(mut self, domain: &str) -> Self {
        self.failing_domains.insert(domain.to_lowercase());
        self
    }

    /// Every appended row, in write order.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().clone()
    }

    /// Number of appended rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    /// Returns true if no row was appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }
}

#[async_trait]
impl TabularSink for MemoryTabularSink {
    async fn append_rows(&self, contacts: &[EnrichedContact]) -> Result<usize, SinkError> {
        if let Some(c) = contacts.iter().find(|c| self.failing_domains.contains(&c.domain)) {
            return Err(SinkError::new("tabular", format!("rejected rows for {}", c.domain)));
        }
        self.rows.lock().extend(contacts.iter().map(tabular_row));
        Ok(contacts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_source() {
        let source = MemoryCompanySource::new(vec![CompanySeed::new("Acme", "acme.com")]);
        assert_eq!(source.load().await.unwrap().len(), 1);

        let failing = MemoryCompanySource::failing("disk on fire");
        assert_eq!(failing.load().await.unwrap_err().to_string(), "Failed to load companies: disk on fire");
    }
}
