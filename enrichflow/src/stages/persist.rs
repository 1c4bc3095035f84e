//! Persistence stage: fan one company's contacts out to both sinks.

use crate::core::EnrichedContact;
use crate::errors::SinkError;
use crate::storage::{DocumentSink, TabularSink};
use crate::utils::now_utc;
use std::sync::Arc;

/// What happened when a company's contacts were written.
#[derive(Debug)]
pub struct PersistOutcome {
    /// The contacts, stamped with `stored_at`.
    pub contacts: Vec<EnrichedContact>,
    /// Result of the document write.
    pub documents: Result<usize, SinkError>,
    /// Result of the tabular write.
    pub rows: Result<usize, SinkError>,
}

impl PersistOutcome {
    /// Contacts that reached at least one sink.
    #[must_use]
    pub fn persisted(&self) -> usize {
        if self.documents.is_ok() || self.rows.is_ok() {
            self.contacts.len()
        } else {
            0
        }
    }

    /// The sink errors, document sink first.
    #[must_use]
    pub fn failures(&self) -> Vec<SinkError> {
        [&self.documents, &self.rows]
            .into_iter()
            .filter_map(|r| r.as_ref().err().cloned())
            .collect()
    }
}

/// Writes contacts to a document sink and a tabular sink.
///
/// The two writes are independent: one failing never prevents or undoes the other.
#[derive(Debug, Clone)]
pub struct PersistenceSink {
    documents: Arc<dyn DocumentSink>,
    table: Arc<dyn TabularSink>,
}

impl PersistenceSink {
    /// Creates a composite sink.
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentSink>, table: Arc<dyn TabularSink>) -> Self {
        Self { documents, table }
    }

    /// Stamps `contacts` and writes them to both sinks concurrently.
    ///
    /// An empty list touches neither sink.
    pub async fn persist(&self, contacts: Vec<EnrichedContact>) -> PersistOutcome {
        if contacts.is_empty() {
            return PersistOutcome {
                contacts,
                documents: Ok(0),
                rows: Ok(0),
            };
        }
        let stored_at = now_utc();
        let contacts: Vec<_> = contacts.into_iter().map(|c| c.stored(stored_at)).collect();
        let (documents, rows) = tokio::join!(
            self.documents.write_batch(&contacts),
            self.table.append_rows(&contacts)
        );
        PersistOutcome {
            contacts,
            documents,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CandidateContact, CompanySeed, ProviderId};
    use crate::testing::{MemoryDocumentSink, MemoryTabularSink};

    fn contacts(domain: &str) -> Vec<EnrichedContact> {
        let seed = CompanySeed::new("Acme", domain);
        vec![
            EnrichedContact::unverified(CandidateContact::new(ProviderId::Lusha, &seed).with_name("A")),
            EnrichedContact::unverified(CandidateContact::new(ProviderId::Lusha, &seed).with_name("B")),
        ]
    }

    #[tokio::test]
    async fn test_writes_both_sinks() {
        let docs = Arc::new(MemoryDocumentSink::new());
        let rows = Arc::new(MemoryTabularSink::new());
        let sink = PersistenceSink::new(docs.clone(), rows.clone());

        let outcome = sink.persist(contacts("acme.com")).await;
        assert_eq!(outcome.persisted(), 2);
        assert!(outcome.failures().is_empty());
        assert!(outcome.contacts.iter().all(|c| c.stored_at.is_some()));
        assert_eq!(docs.len(), 2);
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_one_sink_failing_keeps_the_other() {
        let docs = Arc::new(MemoryDocumentSink::new().fail_for("acme.com"));
        let rows = Arc::new(MemoryTabularSink::new());
        let sink = PersistenceSink::new(docs.clone(), rows.clone());

        let outcome = sink.persist(contacts("acme.com")).await;
        assert_eq!(outcome.persisted(), 2);
        assert_eq!(outcome.failures().len(), 1);
        assert_eq!(outcome.failures()[0].sink, "document");
        assert_eq!(docs.len(), 0);
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_both_failing_persists_nothing() {
        let sink = PersistenceSink::new(
            Arc::new(MemoryDocumentSink::new().fail_for("acme.com")),
            Arc::new(MemoryTabularSink::new().fail_for("acme.com")),
        );
        let outcome = sink.persist(contacts("acme.com")).await;
        assert_eq!(outcome.persisted(), 0);
        assert_eq!(outcome.failures().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_list_touches_nothing() {
        let docs = Arc::new(MemoryDocumentSink::new());
        let sink = PersistenceSink::new(docs.clone(), Arc::new(MemoryTabularSink::new()));
        let outcome = sink.persist(Vec::new()).await;
        assert_eq!(outcome.persisted(), 0);
        assert_eq!(docs.batch_count(), 0);
    }
}
