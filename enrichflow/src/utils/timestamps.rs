//! UTC timestamps.

use chrono::{DateTime, SecondsFormat, Utc};

/// Timestamp type used throughout the crate.
pub type Timestamp = DateTime<Utc>;

/// The current time.
#[must_use]
pub fn now_utc() -> Timestamp {
    Utc::now()
}

/// Renders `ts` as RFC 3339 with microseconds and a `Z` suffix, as stored in documents.
#[must_use]
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
