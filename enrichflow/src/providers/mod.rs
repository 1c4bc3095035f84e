//! Lookup and verification providers.
//!
//! The provider set is closed, so each role is an enum over its concrete
//! adapters rather than a trait object. Every adapter reports failures as
//! [`ProviderError`] values; nothing here panics or swallows an error.

pub mod apollo;
pub mod cognism;
pub mod filters;
pub mod fixture;
pub mod http;
pub mod lusha;
mod payload;
pub mod zerobounce;

pub use apollo::ApolloClient;
pub use cognism::CognismClient;
pub use fixture::{FixtureLookup, FixtureVerifier};
pub use http::{HttpError, HttpTransport};
pub use lusha::LushaClient;
pub use zerobounce::ZeroBounceClient;

use crate::config::EnrichConfig;
use crate::core::{CandidateContact, CompanySeed, ProviderId, VerificationResult};
use crate::errors::{ConfigurationError, ProviderError};
use std::sync::Arc;

/// A contact lookup provider.
#[derive(Debug, Clone)]
pub enum LookupProvider {
    /// Cognism search.
    Cognism(CognismClient),
    /// Lusha prospecting.
    Lusha(LushaClient),
    /// Apollo people search.
    Apollo(ApolloClient),
    /// Canned answers.
    Fixture(FixtureLookup),
}

impl LookupProvider {
    /// Builds the HTTP adapter for `provider` from configuration.
    pub fn from_config(provider: ProviderId, config: &EnrichConfig) -> Result<Self, ConfigurationError> {
        if !provider.is_lookup() {
            return Err(ConfigurationError::invalid(
                "provider_priority",
                format!("'{provider}' is not a lookup provider"),
            ));
        }
        let filters = Arc::new(config.filters.clone());
        let timeout = config.api_timeout();
        let key = config.providers.require(provider)?;
        Ok(match provider {
            ProviderId::Cognism => Self::Cognism(CognismClient::new(key, filters, timeout)?),
            ProviderId::Lusha => Self::Lusha(LushaClient::new(key, filters, timeout)?),
            _ => Self::Apollo(ApolloClient::new(key, filters, timeout)?),
        })
    }

    /// Builds every provider in `provider_priority`, in order.
    pub fn all_from_config(config: &EnrichConfig) -> Result<Vec<Self>, ConfigurationError> {
        config
            .provider_priority
            .iter()
            .map(|provider| Self::from_config(*provider, config))
            .collect()
    }

    /// The provider id results are attributed to.
    #[must_use]
    pub fn id(&self) -> ProviderId {
        match self {
            Self::Cognism(_) => ProviderId::Cognism,
            Self::Lusha(_) => ProviderId::Lusha,
            Self::Apollo(_) => ProviderId::Apollo,
            Self::Fixture(fixture) => fixture.id(),
        }
    }

    /// Searches for at most `limit` contacts at the seed's company.
    pub async fn search(
        &self,
        seed: &CompanySeed,
        limit: usize,
    ) -> Result<Vec<CandidateContact>, ProviderError> {
        let mut found = match self {
            Self::Cognism(client) => client.search(seed, limit).await?,
            Self::Lusha(client) => client.search(seed, limit).await?,
            Self::Apollo(client) => client.search(seed, limit).await?,
            Self::Fixture(fixture) => fixture.search(seed, limit).await?,
        };
        found.truncate(limit);
        Ok(found)
    }
}

impl From<FixtureLookup> for LookupProvider {
    fn from(fixture: FixtureLookup) -> Self {
        Self::Fixture(fixture)
    }
}

/// An email verification provider.
#[derive(Debug, Clone)]
pub enum VerificationProvider {
    /// `ZeroBounce` validate.
    ZeroBounce(ZeroBounceClient),
    /// Canned verdicts.
    Fixture(FixtureVerifier),
}

impl VerificationProvider {
    /// Builds the `ZeroBounce` adapter from configuration.
    pub fn from_config(config: &EnrichConfig) -> Result<Self, ConfigurationError> {
        let key = config.providers.require(ProviderId::ZeroBounce)?;
        Ok(Self::ZeroBounce(ZeroBounceClient::new(key, config.api_timeout())?))
    }

    /// The provider id verdicts are attributed to.
    #[must_use]
    pub fn id(&self) -> ProviderId {
        ProviderId::ZeroBounce
    }

    /// Verifies one email address.
    pub async fn verify(&self, email: &str) -> Result<VerificationResult, ProviderError> {
        match self {
            Self::ZeroBounce(client) => client.verify(email).await,
            Self::Fixture(fixture) => fixture.verify(email).await,
        }
    }
}

impl From<FixtureVerifier> for VerificationProvider {
    fn from(fixture: FixtureVerifier) -> Self {
        Self::Fixture(fixture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderCredentials;

    fn configured() -> EnrichConfig {
        let mut config = EnrichConfig::default();
        config.providers = ProviderCredentials {
            cognism_api_key: Some("cog".to_string()),
            lusha_api_key: Some("lus".to_string()),
            apollo_api_key: Some("apo".to_string()),
            zerobounce_api_key: Some("zb".to_string()),
        };
        config
    }

    #[test]
    fn test_all_from_config_keeps_priority_order() {
        let config = configured().with_provider_priority(vec![ProviderId::Apollo, ProviderId::Cognism]);
        let providers = LookupProvider::all_from_config(&config).unwrap();
        let ids: Vec<_> = providers.iter().map(LookupProvider::id).collect();
        assert_eq!(ids, vec![ProviderId::Apollo, ProviderId::Cognism]);
    }

    #[test]
    fn test_from_config_missing_key() {
        let mut config = configured();
        config.providers.cognism_api_key = None;
        let err = LookupProvider::from_config(ProviderId::Cognism, &config).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingCredential { .. }));
    }

    #[test]
    fn test_verification_from_config() {
        let provider = VerificationProvider::from_config(&configured()).unwrap();
        assert_eq!(provider.id(), ProviderId::ZeroBounce);
        assert!(matches!(provider, VerificationProvider::ZeroBounce(_)));
    }

    #[tokio::test]
    async fn test_search_truncates_to_limit() {
        let seed = CompanySeed::new("Acme", "acme.com");
        let contacts = (0..4)
            .map(|i| CandidateContact::new(ProviderId::Lusha, &seed).with_email(format!("p{i}@acme.com")))
            .collect();
        let provider: LookupProvider = FixtureLookup::new(ProviderId::Lusha)
            .with_contacts("acme.com", contacts)
            .into();

        assert_eq!(provider.id(), ProviderId::Lusha);
        assert_eq!(provider.search(&seed, 2).await.unwrap().len(), 2);
    }
}
