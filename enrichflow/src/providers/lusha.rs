//! Lusha prospecting search adapter.

use super::filters::prospecting_contact_filters;
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
pub const DEFAULT_BASE_URL: &str = "https://api.lusha.com/prospecting";

/// Client for the Lusha prospecting API.
#[derive(Debug, Clone)]
pub struct LushaClient {
    transport: HttpTransport,
    api_key: String,
    filters: Arc<ContactFilters>,
}

impl LushaClient {
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
            transport: HttpTransport::new(ProviderId::Lusha, base_url, timeout)?,
            api_key: api_key.into(),
            filters,
        })
    }

    /// Builds the paged search body for `seed`.
    #[must_use]
    pub fn search_body(&self, seed: &CompanySeed, limit: usize) -> Value {
        json!({
            "pages": { "page": 0, "size": limit },
            "filters": {
                "contacts": prospecting_contact_filters(&self.filters),
                "companies": {
                    "include": { "fqdns": [seed.normalized_domain()] }
                }
            }
        })
    }

    /// Searches for up to `limit` contacts at the seed's domain.
    pub async fn search(
        &self,
        seed: &CompanySeed,
        limit: usize,
    ) -> Result<Vec<CandidateContact>, ProviderError> {
        let request = self
            .transport
            .post("/contact/search")
            .header("api_key", &self.api_key)
            .json(&self.search_body(seed, limit));
        let response: LushaResponse = self.transport.send_json(request).await?;
        let candidates = response.into_candidates(seed);
        debug!(domain = %seed.normalized_domain(), found = candidates.len(), "Lusha search returned");
        Ok(candidates)
    }
}

#[derive(Debug, Default, Deserialize)]
struct LushaResponse {
    #[serde(default)]
    data: Vec<LushaContact>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LushaContact {
    #[serde(deserialize_with = "flex_text")]
    name: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    first_name: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    last_name: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    email_addresses: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    phone_numbers: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    job_title: Option<String>,
    social_links: LushaSocialLinks,
    #[serde(deserialize_with = "flex_text", alias = "departments")]
    department: Option<String>,
    #[serde(deserialize_with = "flex_text")]
    seniority: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LushaSocialLinks {
    #[serde(deserialize_with = "flex_text")]
    linkedin: Option<String>,
}

impl LushaResponse {
    fn into_candidates(self, seed: &CompanySeed) -> Vec<CandidateContact> {
        self.data
            .into_iter()
            .map(|c| CandidateContact {
                name: join_name(c.name, c.first_name, c.last_name),
                email: c.email_addresses,
                phone: c.phone_numbers,
                job_title: c.job_title,
                linkedin_url: c.social_links.linkedin,
                department: c.department,
                seniority: c.seniority,
                ..CandidateContact::new(ProviderId::Lusha, seed)
            })
            .collect()
    }
}
