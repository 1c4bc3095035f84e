//! Cognism contact search adapter.

use super::filters::{map_seniority, COGNISM_SENIORITY};
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
pub const DEFAULT_BASE_URL: &str = "https://app.cognism.com/api";

/// Client for the Cognism search API.
#[derive(Debug, Clone)]
pub struct CognismClient {
    transport: HttpTransport,
    api_key: String,
    filters: Arc<ContactFilters>,
}

impl CognismClient {
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
            transport: HttpTransport::new(ProviderId::Cognism, base_url, timeout)?,
            api_key: api_key.into(),
            filters,
        })
    }

    /// Builds the search body for `seed`.
    #[must_use]
    pub fn search_body(&self, seed: &CompanySeed) -> Value {
        let filters = &self.filters;
        let mut body = json!({
            "jobTitles": filters.include_job_titles,
            "excludeJobTitles": filters.exclude_job_titles,
            "regions": ["EMEA"],
            "countries": [filters.country],
            "departments": filters.include_departments,
            "emailQuality": { "highPlus": true },
            "account": { "domains": [seed.normalized_domain()] },
        });
        if !filters.include_seniority.is_empty() {
            body["seniorities"] = json!(map_seniority(&filters.include_seniority, COGNISM_SENIORITY));
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
            .post(&format!("/search/contact/search?indexSize={limit}"))
            .bearer_auth(&self.api_key)
            .json(&self.search_body(seed));
        let response: CognismResponse = self.transport.send_json(request).await?;
        let candidates = response.into_candidates(seed);
        debug!(domain = %seed.normalized_domain(), found = candidates.len(), "Cognism search returned");
        Ok(candidates)
    }
}

#[derive(Debug, Default, Deserialize)]
struct CognismResponse {
    #[serde(default, alias = "data")]
    contacts: Vec<CognismContact>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CognismContact {
    #[serde(deserialize_with = "flex_text")]
    full_name: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    first_name: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    last_name: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    email: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    phone: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    mobile_phone_numbers: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    direct_phone_numbers: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    job_title: Option<String>,
    #[serde(deserialize_with = "flex_text", alias = "linkedin")]
    linkedin_url: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    department: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    seniority: Option<String>,
}

impl CognismResponse {
    fn into_candidates(self, seed: &CompanySeed) -> Vec<CandidateContact> {
        self.contacts
            .into_iter()
            .map(|c| CandidateContact {
                name: join_name(c.full_name, c.first_name, c.last_name),
                email: c.email,
                phone: c.phone.or(c.mobile_phone_numbers).or(c.direct_phone_numbers),
                job_title: c.job_title,
                linkedin_url: c.linkedin_url,
                department: c.department,
                seniority: c.seniority,
                ..CandidateContact::new(ProviderId::Cognism, seed)
            })
            .collect()
    }
}
