//! `ZeroBounce` email verification adapter.

use super::http::HttpTransport;
use crate::core::{EmailStatus, ProviderId, VerificationResult};
use crate::errors::{ConfigurationError, ProviderError};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.zerobounce.net/v2";

/// Client for the `ZeroBounce` validate endpoint.
#[derive(Debug, Clone)]
pub struct ZeroBounceClient {
    transport: HttpTransport,
    api_key: String,
}

impl ZeroBounceClient {
    /// Creates a client against the production API.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ConfigurationError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, timeout)
    }

    /// Creates a client against another API root.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            transport: HttpTransport::new(ProviderId::ZeroBounce, base_url, timeout)?,
            api_key: api_key.into(),
        })
    }

    /// Verifies one email address.
    pub async fn verify(&self, email: &str) -> Result<VerificationResult, ProviderError> {
        let request = self
            .transport
            .get("/validate")
            .query(&[("api_key", self.api_key.as_str()), ("email", email)]);
        let response: ValidateResponse = self.transport.send_json(request).await?;
        let result = response.into_result(email)?;
        debug!(email = %email, status = %result.status, "ZeroBounce verdict");
        Ok(result)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ValidateResponse {
    address: Option<String>,
    status: Option<String>,
    sub_status: Option<String>,
    error: Option<String>,
}

impl ValidateResponse {
    fn into_result(self, email: &str) -> Result<VerificationResult, ProviderError> {
        // Key and credit problems come back as 200 with an `error` field.
        if let Some(error) = self.error.filter(|e| !e.trim().is_empty()) {
            let lowered = error.to_lowercase();
            return Err(if lowered.contains("key") || lowered.contains("credits") {
                ProviderError::Auth {
                    provider: ProviderId::ZeroBounce,
                    message: error,
                }
            } else {
                ProviderError::malformed(ProviderId::ZeroBounce, error)
            });
        }
        let Some(status) = self.status else {
            return Err(ProviderError::malformed(
                ProviderId::ZeroBounce,
                "response has no status field",
            ));
        };
        let mut result = VerificationResult::new(
            self.address.unwrap_or_else(|| email.to_string()),
            EmailStatus::from_provider_status(&status),
        );
        if let Some(sub_status) = self.sub_status.filter(|s| !s.trim().is_empty()) {
            result = result.with_quality_score(sub_status);
        }
        Ok(result)
    }
}
