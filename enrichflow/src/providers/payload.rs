//! Lenient field decoding for provider person records.
//!
//! Providers disagree on field shapes: an email may be a string, an object
//! with an `address`, or a list of either. These helpers collapse all of
//! those to a single trimmed string.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

const TEXT_KEYS: &[&str] = &["address", "email", "number", "raw_number", "value", "url", "name"];

/// Extracts the first meaningful string out of a JSON value.
#[must_use]
pub fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.iter().find_map(text_of),
        Value::Object(map) => TEXT_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(text_of),
        Value::Null | Value::Bool(_) => None,
    }
}

/// `deserialize_with` adapter around [`text_of`].
pub fn flex_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(text_of))
}

/// Picks the full name, or joins first and last names.
#[must_use]
pub fn join_name(
    full: Option<String>,
    first: Option<String>,
    last: Option<String>,
) -> Option<String> {
    if let Some(full) = full.filter(|n| !n.trim().is_empty()) {
        return Some(full.trim().to_string());
    }
    let joined = [first, last]
        .into_iter()
        .flatten()
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}
