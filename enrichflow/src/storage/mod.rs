//! Company sources and contact sinks.
//!
//! The engine only sees the traits defined here. File-backed
//! implementations live in the submodules; in-memory ones for tests live in
//! [`crate::testing`].

mod csv_source;
mod csv_table;
mod jsonl;

pub use csv_source::CsvCompanySource;
pub use csv_table::CsvTabularSink;
pub use jsonl::JsonLinesDocumentSink;

use crate::core::{CompanySeed, EnrichedContact};
use crate::errors::{SinkError, SourceError};
use crate::utils::format_timestamp;
use async_trait::async_trait;
use std::collections::HashSet;

/// Produces the company seeds for a run.
#[async_trait]
pub trait CompanySource: Send + Sync + std::fmt::Debug {
    /// Loads every seed, in source order.
    async fn load(&self) -> Result<Vec<CompanySeed>, SourceError>;
}

/// Stores one document per enriched contact.
#[async_trait]
pub trait DocumentSink: Send + Sync + std::fmt::Debug {
    /// Writes `contacts`, returning how many were stored.
    async fn write_batch(&self, contacts: &[EnrichedContact]) -> Result<usize, SinkError>;
}

/// Appends one row per enriched contact.
#[async_trait]
pub trait TabularSink: Send + Sync + std::fmt::Debug {
    /// Appends `contacts`, returning how many rows were written.
    async fn append_rows(&self, contacts: &[EnrichedContact]) -> Result<usize, SinkError>;
}

/// Column order of the tabular output.
pub const TABULAR_COLUMNS: [&str; 9] = [
    "company_name",
    "domain",
    "name",
    "enriched_email",
    "enriched_phone",
    "email_status",
    "email_quality_score",
    "is_valid_email",
    "enrichment_source",
];

/// Renders `contact` as a row matching [`TABULAR_COLUMNS`].
#[must_use]
pub fn tabular_row(contact: &EnrichedContact) -> Vec<String> {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    vec![
        contact.company_name.clone(),
        contact.domain.clone(),
        text(&contact.name),
        text(&contact.email),
        text(&contact.phone),
        contact.email_status.to_string(),
        text(&contact.email_quality_score),
        contact.is_valid_email.to_string(),
        contact.enrichment_source.to_string(),
    ]
}

/// Renders `contact` as a stored document.
///
/// The document is the contact's serialized form plus a fresh `_id`, with
/// `stored_at` written as an ISO-8601 string.
#[must_use]
pub fn document(contact: &EnrichedContact) -> serde_json::Value {
    let mut doc = serde_json::to_value(contact).unwrap_or_else(|_| serde_json::json!({}));
    if let Some(map) = doc.as_object_mut() {
        map.insert("_id".to_string(), crate::utils::document_id().into());
        if let Some(at) = &contact.stored_at {
            map.insert("stored_at".to_string(), format_timestamp(at).into());
        }
    }
    doc
}

/// Drops seeds whose normalized domain was already seen, keeping the first.
///
/// Seeds with an empty domain are all kept so that each one can be reported.
#[must_use]
pub fn dedupe_by_domain(seeds: Vec<CompanySeed>) -> Vec<CompanySeed> {
    let mut seen = HashSet::new();
    seeds
        .into_iter()
        .filter(|seed| {
            let domain = seed.normalized_domain();
            domain.is_empty() || seen.insert(domain)
        })
        .collect()
}
