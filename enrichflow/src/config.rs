//! Run configuration.
//!
//! Configuration is layered with `figment`: built-in defaults, then an
//! optional TOML file, then `ENRICH_`-prefixed environment variables
//! (nested keys separated by `__`, e.g. `ENRICH_PROVIDERS__LUSHA_API_KEY`).
//!
//! The resulting [`EnrichConfig`] is passed by value into the workflow
//! engine; nothing reads configuration from ambient state.

use crate::core::ProviderId;
use crate::errors::ConfigurationError;
use crate::workflow::ErrorPolicy;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "ENRICH_";

/// Log verbosity for the binary's subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything.
    Trace,
    /// Stage-level detail.
    Debug,
    /// Per-company progress.
    #[default]
    Info,
    /// Recorded errors only.
    Warn,
    /// Aborts only.
    Error,
}

impl LogLevel {
    /// Returns the `EnvFilter` directive for this level.
    #[must_use]
    pub fn as_directive(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}

/// API keys for each provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCredentials {
    /// Cognism bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognism_api_key: Option<String>,
    /// Lusha API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lusha_api_key: Option<String>,
    /// Apollo API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apollo_api_key: Option<String>,
    /// `ZeroBounce` API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zerobounce_api_key: Option<String>,
}

impl ProviderCredentials {
    /// Returns the key for `provider` if it is set and not a placeholder.
    #[must_use]
    pub fn key_for(&self, provider: ProviderId) -> Option<&str> {
        let key = match provider {
            ProviderId::Cognism => self.cognism_api_key.as_deref(),
            ProviderId::Lusha => self.lusha_api_key.as_deref(),
            ProviderId::Apollo => self.apollo_api_key.as_deref(),
            ProviderId::ZeroBounce => self.zerobounce_api_key.as_deref(),
            ProviderId::Seed => None,
        };
        key.map(str::trim)
            .filter(|k| !k.is_empty() && !k.starts_with("YOUR_"))
    }

    /// Returns the key for `provider`, or the error naming the missing setting.
    pub fn require(&self, provider: ProviderId) -> Result<&str, ConfigurationError> {
        self.key_for(provider)
            .ok_or_else(|| ConfigurationError::MissingCredential {
                provider,
                key: format!("providers.{provider}_api_key"),
            })
    }
}

/// Targeting filters the lookup providers apply to their searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFilters {
    /// Country the contact must be located in.
    #[serde(default = "default_country")]
    pub country: String,
    /// Optional city restriction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Optional state restriction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Departments to include.
    #[serde(default = "default_include_departments")]
    pub include_departments: Vec<String>,
    /// Seniority levels to include (`1` entry .. `9` founder).
    #[serde(default = "default_include_seniority")]
    pub include_seniority: Vec<String>,
    /// Job title keywords to include.
    #[serde(default = "default_include_job_titles")]
    pub include_job_titles: Vec<String>,
    /// Data points a contact must have (e.g. `work_email`).
    #[serde(default = "default_required_data_points")]
    pub required_data_points: Vec<String>,
    /// Departments to exclude.
    #[serde(default = "default_exclude_departments")]
    pub exclude_departments: Vec<String>,
    /// Seniority levels to exclude.
    #[serde(default = "default_exclude_seniority")]
    pub exclude_seniority: Vec<String>,
    /// Job title keywords to exclude (case-insensitive substring match).
    #[serde(default = "default_exclude_job_titles")]
    pub exclude_job_titles: Vec<String>,
}

fn default_country() -> String {
    "France".to_string()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn default_include_departments() -> Vec<String> {
    strings(&["Finance", "Information Technology"])
}

fn default_include_seniority() -> Vec<String> {
    strings(&["5", "6", "7"])
}

fn default_include_job_titles() -> Vec<String> {
    strings(&[
        "IT Head",
        "Chief Financial Officer (CFO)",
        "CFO",
        "Finance Controller",
        "Finance Head",
        "Vice President – Finance",
        "Vice President of Finance",
        "Tax Head",
        "Indirect Tax Manager",
        "Tax Manager",
        "Senior Tax Manager",
        "Group Financial Controller",
        "Group Chief Financial Officer",
        "Tax Senior Manager",
        "Information Technology Manager",
        "VP Finance",
        "Finance Manager",
        "Accounting Head",
        "Accountant",
        "DAF",
        "Directeur Administratif et Financier",
        "contrôleur financier",
        "ERP Head",
        "Compliance",
    ])
}

fn default_required_data_points() -> Vec<String> {
    strings(&["work_email"])
}

fn default_exclude_departments() -> Vec<String> {
    strings(&["Human Resources"])
}

fn default_exclude_seniority() -> Vec<String> {
    strings(&["1", "2", "3"])
}

fn default_exclude_job_titles() -> Vec<String> {
    strings(&[
        "Audit",
        "Corporate Finance",
        "Business Finance",
        "Investments",
        "Portfolio Management",
        "Banking",
        "IT Ops",
        "CIO",
        "CTO",
        "Procurement",
        "Accounts payable",
        "HR",
        "Key Accounts",
        "Strategic Accounts",
        "Assistant",
        "Coordinator",
        "Delivery",
        "Sales",
        "Deputy",
        "Security",
        "Information Security",
        "Risk",
        "CHRO",
        "Marketing",
        "Administrative",
    ])
}

impl Default for ContactFilters {
    fn default() -> Self {
        Self {
            country: default_country(),
            city: None,
            state: None,
            include_departments: default_include_departments(),
            include_seniority: default_include_seniority(),
            include_job_titles: default_include_job_titles(),
            required_data_points: default_required_data_points(),
            exclude_departments: default_exclude_departments(),
            exclude_seniority: default_exclude_seniority(),
            exclude_job_titles: default_exclude_job_titles(),
        }
    }
}

/// Where the file-backed collaborators read and write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// CSV file with `Company name` and `Domain` columns.
    #[serde(default = "default_companies_path")]
    pub companies_path: PathBuf,
    /// JSON-lines file receiving one document per enriched contact.
    #[serde(default = "default_documents_path")]
    pub documents_path: PathBuf,
    /// CSV file receiving one row per enriched contact.
    #[serde(default = "default_sheet_path")]
    pub sheet_path: PathBuf,
}

fn default_companies_path() -> PathBuf {
    PathBuf::from("companies.csv")
}

fn default_documents_path() -> PathBuf {
    PathBuf::from("enriched_contacts.jsonl")
}

fn default_sheet_path() -> PathBuf {
    PathBuf::from("enriched_contacts.csv")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            companies_path: default_companies_path(),
            documents_path: default_documents_path(),
            sheet_path: default_sheet_path(),
        }
    }
}

/// Top-level run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichConfig {
    /// Target number of contacts per company.
    #[serde(default = "default_people_per_company")]
    pub people_per_company: usize,
    /// Timeout applied to every provider call, in seconds.
    #[serde(default = "default_api_timeout")]
    pub api_timeout_seconds: f64,
    /// How many companies run through the pipeline concurrently.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Record failures and keep going instead of aborting the run.
    #[serde(default = "default_continue_on_error")]
    pub continue_on_error: bool,
    /// Log verbosity.
    #[serde(default)]
    pub log_level: LogLevel,
    /// Lookup providers to query, highest merge priority first.
    #[serde(default = "default_provider_priority")]
    pub provider_priority: Vec<ProviderId>,
    /// Halt the run once this many errors are recorded. Unlimited when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_errors: Option<usize>,
    /// Provider credentials.
    #[serde(default)]
    pub providers: ProviderCredentials,
    /// Contact targeting filters.
    #[serde(default)]
    pub filters: ContactFilters,
    /// File locations for the collaborators.
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_people_per_company() -> usize {
    5
}

fn default_api_timeout() -> f64 {
    30.0
}

/// Upper bound accepted for `api_timeout_seconds`.
pub const MAX_API_TIMEOUT_SECONDS: f64 = 3600.0;

fn default_batch_size() -> usize {
    1
}

fn default_continue_on_error() -> bool {
    true
}

fn default_provider_priority() -> Vec<ProviderId> {
    ProviderId::LOOKUPS.to_vec()
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            people_per_company: default_people_per_company(),
            api_timeout_seconds: default_api_timeout(),
            batch_size: default_batch_size(),
            continue_on_error: default_continue_on_error(),
            log_level: LogLevel::default(),
            provider_priority: default_provider_priority(),
            max_errors: None,
            providers: ProviderCredentials::default(),
            filters: ContactFilters::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl EnrichConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads defaults, then `path` (if given and present), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigurationError::Load(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }
        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Parses configuration from a TOML string layered over defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigurationError> {
        Self::extract(Figment::from(Serialized::defaults(Self::default())).merge(Toml::string(toml)))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigurationError> {
        figment
            .extract()
            .map_err(|e| ConfigurationError::Load(e.to_string()))
    }

    /// Sets the target contacts per company.
    #[must_use]
    pub fn with_people_per_company(mut self, count: usize) -> Self {
        self.people_per_company = count;
        self
    }

    /// Sets the provider call timeout.
    #[must_use]
    pub fn with_api_timeout(mut self, seconds: f64) -> Self {
        self.api_timeout_seconds = seconds;
        self
    }

    /// Sets the company pipelining width.
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Sets the continue-on-error flag.
    #[must_use]
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// Sets the error budget.
    #[must_use]
    pub fn with_max_errors(mut self, max: usize) -> Self {
        self.max_errors = Some(max);
        self
    }

    /// Sets the lookup provider priority.
    #[must_use]
    pub fn with_provider_priority(mut self, priority: Vec<ProviderId>) -> Self {
        self.provider_priority = priority;
        self
    }

    /// Provider call timeout as a `Duration`, clamped to
    /// `0..=MAX_API_TIMEOUT_SECONDS` for configs that skipped validation.
    #[must_use]
    pub fn api_timeout(&self) -> Duration {
        let seconds = if self.api_timeout_seconds.is_nan() {
            0.0
        } else {
            self.api_timeout_seconds.clamp(0.0, MAX_API_TIMEOUT_SECONDS)
        };
        Duration::from_secs_f64(seconds)
    }

    /// The error policy selected by `continue_on_error`.
    #[must_use]
    pub fn error_policy(&self) -> ErrorPolicy {
        ErrorPolicy::from_continue_on_error(self.continue_on_error)
    }

    /// Checks ranges and cross-field consistency. Does not touch credentials.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(1..=50).contains(&self.people_per_company) {
            return Err(ConfigurationError::invalid(
                "people_per_company",
                format!("must be between 1 and 50, got {}", self.people_per_company),
            ));
        }
        if !(self.api_timeout_seconds > 0.0 && self.api_timeout_seconds <= MAX_API_TIMEOUT_SECONDS) {
            return Err(ConfigurationError::invalid(
                "api_timeout_seconds",
                format!(
                    "must be greater than 0 and at most {MAX_API_TIMEOUT_SECONDS}, got {}",
                    self.api_timeout_seconds
                ),
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigurationError::invalid("batch_size", "must be at least 1"));
        }
        if self.max_errors == Some(0) {
            return Err(ConfigurationError::invalid("max_errors", "must be at least 1 when set"));
        }
        if self.provider_priority.is_empty() {
            return Err(ConfigurationError::invalid(
                "provider_priority",
                "at least one lookup provider is required",
            ));
        }
        let mut seen = HashSet::new();
        for provider in &self.provider_priority {
            if !provider.is_lookup() {
                return Err(ConfigurationError::invalid(
                    "provider_priority",
                    format!("'{provider}' is not a lookup provider"),
                ));
            }
            if !seen.insert(provider) {
                return Err(ConfigurationError::invalid(
                    "provider_priority",
                    format!("'{provider}' is listed twice"),
                ));
            }
        }
        for (field, path) in [
            ("storage.companies_path", &self.storage.companies_path),
            ("storage.documents_path", &self.storage.documents_path),
            ("storage.sheet_path", &self.storage.sheet_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigurationError::invalid(field, "must not be empty"));
            }
        }
        Ok(())
    }

    /// Checks that every enabled provider has a usable credential.
    pub fn validate_credentials(&self) -> Result<(), ConfigurationError> {
        for provider in &self.provider_priority {
            self.providers.require(*provider)?;
        }
        self.providers.require(ProviderId::ZeroBounce)?;
        Ok(())
    }
}
