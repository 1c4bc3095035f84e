//! Identifier and timestamp helpers for run summaries and persisted documents.

mod ids;
mod timestamps;

pub use ids::{document_id, generate_uuid};
pub use timestamps::{format_timestamp, now_utc, Timestamp};
