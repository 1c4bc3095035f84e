//! Error types for the enrichment workflow.
//!
//! The taxonomy follows the blast radius of each failure:
//!
//! - [`ConfigurationError`] is fatal and surfaces before any stage runs.
//! - [`ProviderError`] is scoped to a single provider call.
//! - [`SinkError`] is scoped to one company's persistence step.
//! - [`ValidationError`] is scoped to one malformed company seed.
//! - [`SourceError`] means the company list itself could not be loaded.

use crate::core::ProviderId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The umbrella error type for enrichflow operations.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Configuration could not be loaded or is invalid.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// A provider call failed.
    #[error("{0}")]
    Provider(#[from] ProviderError),

    /// A persistence sink rejected a write.
    #[error("{0}")]
    Sink(#[from] SinkError),

    /// A company seed is malformed.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The company source could not be read.
    #[error("{0}")]
    Source(#[from] SourceError),
}

impl EnrichError {
    /// Returns the coarse error category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Provider(_) => ErrorKind::Provider,
            Self::Sink(_) => ErrorKind::Sink,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Source(_) => ErrorKind::Source,
        }
    }
}

/// Coarse category of a recorded error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Invalid or missing configuration.
    Configuration,
    /// A provider call failed.
    Provider,
    /// A sink write failed.
    Sink,
    /// A seed failed validation.
    Validation,
    /// The company source failed.
    Source,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Provider => write!(f, "provider"),
            Self::Sink => write!(f, "sink"),
            Self::Validation => write!(f, "validation"),
            Self::Source => write!(f, "source"),
        }
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The configuration could not be read or parsed.
    #[error("Failed to load configuration: {0}")]
    Load(String),

    /// A credential required by an enabled provider is missing.
    #[error("Missing credential for provider '{provider}' (set {key})")]
    MissingCredential {
        /// The provider needing the credential.
        provider: ProviderId,
        /// The configuration key to set.
        key: String,
    },

    /// A field holds an out-of-range or inconsistent value.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        /// The offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// A client could not be constructed.
    #[error("Failed to build client for provider '{provider}': {message}")]
    Client {
        /// The provider whose client failed.
        provider: ProviderId,
        /// The underlying error.
        message: String,
    },
}

impl ConfigurationError {
    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A typed failure from a single provider call.
///
/// Adapters never panic or raise past their boundary; every failure mode of
/// the outbound call ends up as one of these variants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The call did not finish within the configured timeout.
    #[error("{provider} timed out after {timeout_ms}ms")]
    Timeout {
        /// The provider.
        provider: ProviderId,
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The provider rejected the credentials.
    #[error("{provider} rejected credentials: {message}")]
    Auth {
        /// The provider.
        provider: ProviderId,
        /// Response detail.
        message: String,
    },

    /// The provider is throttling requests.
    #[error("{provider} rate limited the request")]
    RateLimited {
        /// The provider.
        provider: ProviderId,
        /// Seconds to wait, from the `Retry-After` header when present.
        retry_after_secs: Option<u64>,
    },

    /// The response body could not be decoded.
    #[error("{provider} returned a malformed response: {message}")]
    Malformed {
        /// The provider.
        provider: ProviderId,
        /// Decoder detail.
        message: String,
    },

    /// The request never produced a response.
    #[error("{provider} request failed: {message}")]
    Transport {
        /// The provider.
        provider: ProviderId,
        /// Transport detail.
        message: String,
    },

    /// The provider answered with a non-success status.
    #[error("{provider} API error (status {status}): {message}")]
    Api {
        /// The provider.
        provider: ProviderId,
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },
}

impl ProviderError {
    /// Returns the provider that produced the error.
    #[must_use]
    pub fn provider(&self) -> ProviderId {
        match self {
            Self::Timeout { provider, .. }
            | Self::Auth { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::Malformed { provider, .. }
            | Self::Transport { provider, .. }
            | Self::Api { provider, .. } => *provider,
        }
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::Transport {
            provider,
            message: message.into(),
        }
    }

    /// Creates a malformed response error.
    #[must_use]
    pub fn malformed(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::Malformed {
            provider,
            message: message.into(),
        }
    }

    /// Short machine-readable label for the failure mode.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Auth { .. } => "auth",
            Self::RateLimited { .. } => "rate_limited",
            Self::Malformed { .. } => "malformed",
            Self::Transport { .. } => "transport",
            Self::Api { .. } => "api",
        }
    }
}

/// A persistence sink failed to record a company's contacts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{sink} sink write failed: {message}")]
pub struct SinkError {
    /// Which sink failed (`document` or `tabular`).
    pub sink: String,
    /// Failure detail.
    pub message: String,
}

impl SinkError {
    /// Creates a new sink error.
    #[must_use]
    pub fn new(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            message: message.into(),
        }
    }
}

/// A company seed is missing required data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid company seed '{company}': {field} {message}")]
pub struct ValidationError {
    /// The company name as loaded.
    pub company: String,
    /// The offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(
        company: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            company: company.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The company source could not produce a company list.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Failed to load companies: {0}")]
pub struct SourceError(pub String);

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        Self(err.to_string())
    }
}

impl From<csv::Error> for SourceError {
    fn from(err: csv::Error) -> Self {
        Self(err.to_string())
    }
}
