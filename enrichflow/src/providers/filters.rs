//! Translation of [`ContactFilters`] into provider request vocabularies.

use crate::config::ContactFilters;
use serde_json::{json, Map, Value};

/// Cognism seniority labels for the numeric levels.
pub const COGNISM_SENIORITY: &[(&str, &str)] = &[("5", "director"), ("6", "vp"), ("7", "c_level")];

/// Apollo seniority labels for the numeric levels.
pub const APOLLO_SENIORITY: &[(&str, &str)] =
    &[("4", "manager"), ("5", "director"), ("6", "vp"), ("7", "cxo")];

/// Maps numeric seniority levels through `table`; unmapped levels pass through unchanged.
#[must_use]
pub fn map_seniority(levels: &[String], table: &[(&str, &str)]) -> Vec<String> {
    levels
        .iter()
        .map(|level| {
            table
                .iter()
                .find(|(from, _)| from == level)
                .map_or_else(|| level.clone(), |(_, to)| (*to).to_string())
        })
        .collect()
}

/// Returns true if `title` contains any excluded keyword (case-insensitive).
#[must_use]
pub fn is_excluded_title(title: &str, filters: &ContactFilters) -> bool {
    let title = title.to_lowercase();
    filters
        .exclude_job_titles
        .iter()
        .any(|keyword| title.contains(&keyword.to_lowercase()))
}

/// Builds the include/exclude contact filter object used by prospecting searches.
///
/// Empty lists are omitted, and the `exclude` object is dropped entirely
/// when it would be empty.
#[must_use]
pub fn prospecting_contact_filters(filters: &ContactFilters) -> Value {
    let mut location = Map::new();
    location.insert("country".to_string(), json!(filters.country));
    if let Some(city) = filters.city.as_deref().filter(|c| !c.is_empty()) {
        location.insert("city".to_string(), json!(city));
    }
    if let Some(state) = filters.state.as_deref().filter(|s| !s.is_empty()) {
        location.insert("state".to_string(), json!(state));
    }

    let mut include = Map::new();
    include.insert("locations".to_string(), json!([location]));
    insert_non_empty(&mut include, "departments", &filters.include_departments);
    insert_non_empty(&mut include, "seniority", &filters.include_seniority);
    insert_non_empty(&mut include, "jobTitles", &filters.include_job_titles);
    insert_non_empty(&mut include, "existing_data_points", &filters.required_data_points);

    let mut exclude = Map::new();
    insert_non_empty(&mut exclude, "departments", &filters.exclude_departments);
    insert_non_empty(&mut exclude, "seniority", &filters.exclude_seniority);
    insert_non_empty(&mut exclude, "jobTitles", &filters.exclude_job_titles);

    let mut out = Map::new();
    out.insert("include".to_string(), Value::Object(include));
    if !exclude.is_empty() {
        out.insert("exclude".to_string(), Value::Object(exclude));
    }
    Value::Object(out)
}

fn insert_non_empty(map: &mut Map<String, Value>, key: &str, values: &[String]) {
    if !values.is_empty() {
        map.insert(key.to_string(), json!(values));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_seniority() {
        let levels = vec!["5".to_string(), "7".to_string(), "9".to_string()];
        assert_eq!(
            map_seniority(&levels, COGNISM_SENIORITY),
            vec!["director", "c_level", "9"]
        );
        assert_eq!(
            map_seniority(&levels, APOLLO_SENIORITY),
            vec!["director", "cxo", "9"]
        );
    }

    #[test]
    fn test_is_excluded_title() {
        let filters = ContactFilters::default();
        assert!(is_excluded_title("Head of Internal Audit", &filters));
        assert!(is_excluded_title("SALES Director", &filters));
        assert!(!is_excluded_title("Chief Financial Officer", &filters));
    }

    #[test]
    fn test_prospecting_filters_defaults() {
        let value = prospecting_contact_filters(&ContactFilters::default());
        assert_eq!(value["include"]["locations"][0]["country"], "France");
        assert!(value["include"]["locations"][0].get("city").is_none());
        assert_eq!(value["include"]["seniority"], json!(["5", "6", "7"]));
        assert_eq!(value["include"]["existing_data_points"], json!(["work_email"]));
        assert_eq!(value["exclude"]["departments"], json!(["Human Resources"]));
    }

    #[test]
    fn test_prospecting_filters_drop_empty_exclude() {
        let filters = ContactFilters {
            city: Some("Paris".to_string()),
            exclude_departments: vec![],
            exclude_seniority: vec![],
            exclude_job_titles: vec![],
            ..ContactFilters::default()
        };
        let value = prospecting_contact_filters(&filters);
        assert_eq!(value["include"]["locations"][0]["city"], "Paris");
        assert!(value.get("exclude").is_none());
    }
}
