//! Shared HTTP plumbing for the provider adapters.

use crate::core::ProviderId;
use crate::errors::{ConfigurationError, ProviderError};
use reqwest::header::RETRY_AFTER;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Transport-level failure, before it is attributed to a provider.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The client-side timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// The request could not be sent or the body could not be read.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
        /// Parsed `Retry-After` header, in seconds.
        retry_after: Option<u64>,
    },

    /// The body was not the JSON shape we expected.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl HttpError {
    /// Attributes the failure to `provider`, classifying HTTP statuses.
    #[must_use]
    pub fn into_provider_error(self, provider: ProviderId, timeout: Duration) -> ProviderError {
        match self {
            Self::Timeout => ProviderError::Timeout {
                provider,
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            },
            Self::Network(message) => ProviderError::Transport { provider, message },
            Self::Parse(message) => ProviderError::Malformed { provider, message },
            Self::Status {
                status: 401 | 403,
                message,
                ..
            } => ProviderError::Auth { provider, message },
            Self::Status {
                status: 429,
                retry_after,
                ..
            } => ProviderError::RateLimited {
                provider,
                retry_after_secs: retry_after,
            },
            Self::Status {
                status, message, ..
            } => ProviderError::Api {
                provider,
                status,
                message,
            },
        }
    }
}

/// A reqwest client bound to one provider's base URL and timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    provider: ProviderId,
    timeout: Duration,
}

impl HttpTransport {
    /// Creates a transport for `provider`.
    pub fn new(
        provider: ProviderId,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigurationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("enrichflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigurationError::Client {
                provider,
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            provider,
            timeout,
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Starts a POST request to `path` under the base URL.
    #[must_use]
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(format!("{}{}", self.base_url, path))
    }

    /// Starts a GET request to `path` under the base URL.
    #[must_use]
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(format!("{}{}", self.base_url, path))
    }

    /// Sends the request and decodes a JSON body, mapping every failure to a `ProviderError`.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ProviderError> {
        self.try_send_json(request)
            .await
            .map_err(|e| e.into_provider_error(self.provider, self.timeout))
    }

    async fn try_send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, HttpError> {
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let retry_after = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            let body = resp.text().await.unwrap_or_default();
            return Err(HttpError::Status {
                status: status.as_u16(),
                message: body,
                retry_after,
            });
        }
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
