//! Identifier generation.

use uuid::Uuid;

/// A random id for a run.
#[must_use]
pub fn generate_uuid() -> Uuid {
    Uuid::new_v4()
}

/// A time-ordered id for a persisted document, so one run's documents sort by insertion.
#[must_use]
pub fn document_id() -> String {
    Uuid::now_v7().to_string()
}
