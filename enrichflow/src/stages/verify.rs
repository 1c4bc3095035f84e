//! Email verification stage.

use crate::core::{CandidateContact, EnrichedContact, VerificationResult};
use crate::errors::ProviderError;
use crate::providers::VerificationProvider;
use futures::future::join_all;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Result of verifying one company's contacts.
#[derive(Debug, Clone, Default)]
pub struct VerificationBatch {
    /// One record per input candidate, in input order.
    pub contacts: Vec<EnrichedContact>,
    /// Verification calls that failed. Their contacts carry status `unknown`.
    pub failures: Vec<ProviderError>,
}

/// Verifies each contact's email with a single provider.
#[derive(Debug, Clone)]
pub struct VerifierStage {
    provider: VerificationProvider,
    call_timeout: Duration,
}

impl VerifierStage {
    /// Creates a stage bounding each call by `call_timeout`.
    #[must_use]
    pub fn new(provider: VerificationProvider, call_timeout: Duration) -> Self {
        Self {
            provider,
            call_timeout,
        }
    }

    /// Verifies every contact concurrently.
    ///
    /// Contacts without an email are passed through unverified and never
    /// reach the provider. A failed call leaves its contact `unknown` and is
    /// reported in `failures`; the contact itself is kept.
    pub async fn verify_batch(&self, candidates: Vec<CandidateContact>) -> VerificationBatch {
        let calls = candidates.into_iter().map(|candidate| async move {
            let Some(email) = candidate.normalized_email() else {
                return (EnrichedContact::unverified(candidate), None);
            };
            match self.verify_one(&email).await {
                Ok(result) => (EnrichedContact::verified(candidate, result), None),
                Err(error) => (EnrichedContact::unverified(candidate), Some(error)),
            }
        });

        let mut batch = VerificationBatch::default();
        for (contact, failure) in join_all(calls).await {
            batch.contacts.push(contact);
            batch.failures.extend(failure);
        }
        debug!(
            contacts = batch.contacts.len(),
            failed = batch.failures.len(),
            "Verification batch resolved"
        );
        batch
    }

    async fn verify_one(&self, email: &str) -> Result<VerificationResult, ProviderError> {
        match timeout(self.call_timeout, self.provider.verify(email)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                provider: self.provider.id(),
                timeout_ms: u64::try_from(self.call_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CompanySeed, EmailStatus, ProviderId};
    use crate::providers::FixtureVerifier;

    fn candidate(email: Option<&str>) -> CandidateContact {
        let c = CandidateContact::new(ProviderId::Lusha, &CompanySeed::new("Acme", "acme.com"))
            .with_name("Someone");
        match email {
            Some(e) => c.with_email(e),
            None => c,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_preserved_despite_completion_order() {
        let verifier = FixtureVerifier::new()
            .with_delay_for("slow@acme.com", Duration::from_millis(60))
            .with_status("fast@acme.com", EmailStatus::Invalid);
        let stage = VerifierStage::new(verifier.into(), Duration::from_secs(1));

        let batch = stage
            .verify_batch(vec![candidate(Some("slow@acme.com")), candidate(Some("fast@acme.com"))])
            .await;

        let emails: Vec<_> = batch.contacts.iter().filter_map(|c| c.email.as_deref()).collect();
        assert_eq!(emails, vec!["slow@acme.com", "fast@acme.com"]);
        assert!(batch.contacts[0].is_valid_email);
        assert_eq!(batch.contacts[1].email_status, EmailStatus::Invalid);
    }

    #[tokio::test]
    async fn test_missing_email_skips_provider() {
        let verifier = FixtureVerifier::new();
        let stage = VerifierStage::new(verifier.clone().into(), Duration::from_secs(1));

        let batch = stage.verify_batch(vec![candidate(None)]).await;
        assert_eq!(batch.contacts.len(), 1);
        assert_eq!(batch.contacts[0].email_status, EmailStatus::Unknown);
        assert!(!batch.contacts[0].is_valid_email);
        assert_eq!(verifier.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_keeps_contact_unknown() {
        let verifier = FixtureVerifier::new()
            .with_failure("a@acme.com", ProviderError::transport(ProviderId::ZeroBounce, "down"));
        let stage = VerifierStage::new(verifier.into(), Duration::from_secs(1));

        let batch = stage
            .verify_batch(vec![candidate(Some("a@acme.com")), candidate(Some("b@acme.com"))])
            .await;
        assert_eq!(batch.contacts.len(), 2);
        assert_eq!(batch.contacts[0].email_status, EmailStatus::Unknown);
        assert!(batch.contacts[1].is_valid_email);
        assert_eq!(batch.failures.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_failure() {
        let verifier = FixtureVerifier::new().with_delay_for("a@acme.com", Duration::from_secs(5));
        let stage = VerifierStage::new(verifier.into(), Duration::from_millis(30));

        let batch = stage.verify_batch(vec![candidate(Some("a@acme.com"))]).await;
        assert_eq!(batch.failures[0].label(), "timeout");
        assert_eq!(batch.contacts[0].email_status, EmailStatus::Unknown);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let stage = VerifierStage::new(FixtureVerifier::new().into(), Duration::from_secs(1));
        let batch = stage.verify_batch(Vec::new()).await;
        assert!(batch.contacts.is_empty());
        assert!(batch.failures.is_empty());
    }
}
