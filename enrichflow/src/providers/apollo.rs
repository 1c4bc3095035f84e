//! Apollo people search adapter.
//!
//! Apollo has no exclusion filter for job titles, so excluded titles are
//! dropped client-side after the response arrives.

use super::filters::{is_excluded_title, map_seniority, APOLLO_SENIORITY};
use super::http::HttpTransport;
use super::payload::{flex_text, join_name};
use crate::config::ContactFilters;
use crate::core::{CandidateContact, CompanySeed, ProviderId};
use crate::errors::{ConfigurationError, ProviderError};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.apollo.io/api/v1";

/// Client for the Apollo people search API.
#[derive(Debug, Clone)]
pub struct ApolloClient {
    transport: HttpTransport,
    api_key: String,
    filters: Arc<ContactFilters>,
}

impl ApolloClient {
    /// Creates a client against the production API.
    pub fn new(
        api_key: impl Into<String>,
        filters: Arc<ContactFilters>,
        timeout: Duration,
    ) -> Result<Self, ConfigurationError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, filters, timeout)
    }

    /// Creates a client against another API root.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        filters: Arc<ContactFilters>,
        timeout: Duration,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            transport: HttpTransport::new(ProviderId::Apollo, base_url, timeout)?,
            api_key: api_key.into(),
            filters,
        })
    }

    /// Builds the search body for `seed`.
    #[must_use]
    pub fn search_body(&self, seed: &CompanySeed, limit: usize) -> Value {
        let filters = &self.filters;
        let mut body = json!({
            "page": 1,
            "per_page": limit,
            "person_titles": filters.include_job_titles,
            "q_organization_domains": seed.normalized_domain(),
            "contact_email_status": ["verified", "guessed", "unavailable"],
        });
        if !filters.country.is_empty() {
            body["person_locations"] = json!([filters.country]);
        }
        if !filters.include_seniority.is_empty() {
            body["person_seniorities"] =
                json!(map_seniority(&filters.include_seniority, APOLLO_SENIORITY));
        }
        body
    }

    /// Searches for up to `limit` contacts at the seed's domain.
    pub async fn search(
        &self,
        seed: &CompanySeed,
        limit: usize,
    ) -> Result<Vec<CandidateContact>, ProviderError> {
        let request = self
            .transport
            .post("/mixed_people/api_search")
            .header("x-api-key", &self.api_key)
            .json(&self.search_body(seed, limit));
        let response: ApolloResponse = self.transport.send_json(request).await?;
        let returned = response.people.len();
        let candidates = response.into_candidates(seed, &self.filters);
        debug!(
            domain = %seed.normalized_domain(),
            found = candidates.len(),
            returned,
            "Apollo search returned"
        );
        Ok(candidates)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ApolloResponse {
    #[serde(default, alias = "contacts")]
    people: Vec<ApolloPerson>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApolloPerson {
    #[serde(deserialize_with = "flex_text")]
    name: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    first_name: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    last_name: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    title: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    email: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    linkedin_url: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    departments: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    seniority: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    phone_numbers: Option<String>,
}

impl ApolloResponse {
    fn into_candidates(self, seed: &CompanySeed, filters: &ContactFilters) -> Vec<CandidateContact> {
        self.people
            .into_iter()
            .filter(|p| {
                !p.title
                    .as_deref()
                    .is_some_and(|title| is_excluded_title(title, filters))
            })
            .map(|p| CandidateContact {
                name: join_name(p.name, p.first_name, p.last_name),
                email: p.email,
                phone: p.phone_numbers,
                job_title: p.title,
                linkedin_url: p.linkedin_url,
                department: p.departments,
                seniority: p.seniority,
                ..CandidateContact::new(ProviderId::Apollo, seed)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApolloClient {
        ApolloClient::new("key", Arc::new(ContactFilters::default()), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_search_body() {
        let body = client().search_body(&CompanySeed::new("Acme", " acme.COM"), 3);
        assert_eq!(body["per_page"], json!(3));
        assert_eq!(body["q_organization_domains"], json!("acme.com"));
        assert_eq!(body["person_locations"], json!(["France"]));
        assert_eq!(body["person_seniorities"], json!(["director", "vp", "cxo"]));
    }

    #[test]
    fn test_excluded_titles_dropped() {
        let raw = json!({
            "people": [
                {"name": "Jane Doe", "title": "Chief Financial Officer", "email": "jane@acme.com"},
                {"name": "Sam Sales", "title": "Sales Director", "email": "sam@acme.com"},
                {"first_name": "No", "last_name": "Title"}
            ]
        });
        let response: ApolloResponse = serde_json::from_value(raw).unwrap();
        let candidates =
            response.into_candidates(&CompanySeed::new("Acme", "acme.com"), &ContactFilters::default());

        let names: Vec<_> = candidates.iter().filter_map(|c| c.name.as_deref()).collect();
        assert_eq!(names, vec!["Jane Doe", "No Title"]);
        assert!(candidates.iter().all(|c| c.source == ProviderId::Apollo));
    }

    #[test]
    fn test_phone_numbers_raw_number() {
        let raw = json!({
            "contacts": [{"name": "Jane", "phone_numbers": [{"raw_number": "+1 555"}], "departments": ["finance"]}]
        });
        let response: ApolloResponse = serde_json::from_value(raw).unwrap();
        let candidates =
            response.into_candidates(&CompanySeed::new("Acme", "acme.com"), &ContactFilters::default());
        assert_eq!(candidates[0].phone.as_deref(), Some("+1 555"));
        assert_eq!(candidates[0].department.as_deref(), Some("finance"));
    }
}
