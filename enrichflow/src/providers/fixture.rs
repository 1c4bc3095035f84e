//! In-process providers that answer from canned data.
//!
//! Fixtures impersonate a real provider id so that merge priority and
//! error attribution behave exactly as they would against the network.

use crate::core::{CandidateContact, CompanySeed, EmailStatus, ProviderId, VerificationResult};
use crate::errors::ProviderError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
enum FixtureAnswer {
    Contacts(Vec<CandidateContact>),
    Fail(ProviderError),
}

/// A lookup provider backed by per-domain canned answers.
///
/// Domains without an answer return no candidates.
#[derive(Debug, Clone)]
pub struct FixtureLookup {
    provider: ProviderId,
    answers: Arc<HashMap<String, FixtureAnswer>>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl FixtureLookup {
    /// Creates an empty fixture answering as `provider`.
    #[must_use]
    pub fn new(provider: ProviderId) -> Self {
        Self {
            provider,
            answers: Arc::new(HashMap::new()),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Answers searches for `domain` with `contacts`.
    ///
    /// Each contact is re-attributed to this provider and the searched seed.
    #[must_use]
    pub fn with_contacts(mut self, domain: &str, contacts: Vec<CandidateContact>) -> Self {
        Arc::make_mut(&mut self.answers)
            .insert(domain.trim().to_lowercase(), FixtureAnswer::Contacts(contacts));
        self
    }

    /// Fails searches for `domain` with `error`.
    #[must_use]
    pub fn with_failure(mut self, domain: &str, error: ProviderError) -> Self {
        Arc::make_mut(&mut self.answers).insert(domain.trim().to_lowercase(), FixtureAnswer::Fail(error));
        self
    }

    /// Sleeps before every answer.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// The provider this fixture answers as.
    #[must_use]
    pub fn id(&self) -> ProviderId {
        self.provider
    }

    /// Number of searches received so far, across clones.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Answers a search for `seed`.
    pub async fn search(
        &self,
        seed: &CompanySeed,
        limit: usize,
    ) -> Result<Vec<CandidateContact>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.answers.get(&seed.normalized_domain()) {
            None => Ok(Vec::new()),
            Some(FixtureAnswer::Fail(error)) => Err(error.clone()),
            Some(FixtureAnswer::Contacts(contacts)) => Ok(contacts
                .iter()
                .take(limit)
                .map(|c| CandidateContact {
                    source: self.provider,
                    domain: seed.normalized_domain(),
                    company_name: seed.company_name.trim().to_string(),
                    ..c.clone()
                })
                .collect()),
        }
    }
}

#[derive(Debug, Clone)]
enum VerdictAnswer {
    Status(EmailStatus, Option<String>),
    Fail(ProviderError),
}

/// A verification provider backed by per-email canned verdicts.
///
/// Emails without a verdict get the default status (`valid` unless changed).
#[derive(Debug, Clone)]
pub struct FixtureVerifier {
    verdicts: Arc<HashMap<String, VerdictAnswer>>,
    delays: Arc<HashMap<String, Duration>>,
    default_status: EmailStatus,
    checked: Arc<Mutex<Vec<String>>>,
}

impl Default for FixtureVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureVerifier {
    /// Creates a verifier that marks every email valid.
    #[must_use]
    pub fn new() -> Self {
        Self {
            verdicts: Arc::new(HashMap::new()),
            delays: Arc::new(HashMap::new()),
            default_status: EmailStatus::Valid,
            checked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sets the status returned for emails without an explicit verdict.
    #[must_use]
    pub fn with_default_status(mut self, status: EmailStatus) -> Self {
        self.default_status = status;
        self
    }

    /// Returns `status` for `email`.
    #[must_use]
    pub fn with_status(mut self, email: &str, status: EmailStatus) -> Self {
        Arc::make_mut(&mut self.verdicts).insert(normalize(email), VerdictAnswer::Status(status, None));
        self
    }

    /// Returns `status` with a quality score for `email`.
    #[must_use]
    pub fn with_scored_status(mut self, email: &str, status: EmailStatus, score: &str) -> Self {
        Arc::make_mut(&mut self.verdicts).insert(
            normalize(email),
            VerdictAnswer::Status(status, Some(score.to_string())),
        );
        self
    }

    /// Fails verification of `email` with `error`.
    #[must_use]
    pub fn with_failure(mut self, email: &str, error: ProviderError) -> Self {
        Arc::make_mut(&mut self.verdicts).insert(normalize(email), VerdictAnswer::Fail(error));
        self
    }

    /// Sleeps before answering for `email`.
    #[must_use]
    pub fn with_delay_for(mut self, email: &str, delay: Duration) -> Self {
        Arc::make_mut(&mut self.delays).insert(normalize(email), delay);
        self
    }

    /// Every email checked so far, in call order, across clones.
    #[must_use]
    pub fn checked(&self) -> Vec<String> {
        self.checked.lock().clone()
    }

    /// Number of verifications received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.checked.lock().len()
    }

    /// Answers a verification request.
    pub async fn verify(&self, email: &str) -> Result<VerificationResult, ProviderError> {
        let key = normalize(email);
        self.checked.lock().push(key.clone());
        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }
        match self.verdicts.get(&key) {
            Some(VerdictAnswer::Fail(error)) => Err(error.clone()),
            Some(VerdictAnswer::Status(status, score)) => {
                let result = VerificationResult::new(email, *status);
                Ok(match score {
                    Some(score) => result.with_quality_score(score.clone()),
                    None => result,
                })
            }
            None => Ok(VerificationResult::new(email, self.default_status)),
        }
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixture_lookup_reattributes() {
        let seed = CompanySeed::new("Acme", "acme.com");
        let other = CompanySeed::new("Other", "other.com");
        let lookup = FixtureLookup::new(ProviderId::Lusha).with_contacts(
            "ACME.com",
            vec![
                CandidateContact::new(ProviderId::Seed, &other).with_email("a@acme.com"),
                CandidateContact::new(ProviderId::Seed, &other).with_email("b@acme.com"),
            ],
        );

        let found = lookup.search(&seed, 1).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source, ProviderId::Lusha);
        assert_eq!(found[0].domain, "acme.com");
        assert_eq!(found[0].company_name, "Acme");

        assert!(lookup.search(&other, 5).await.unwrap().is_empty());
        assert_eq!(lookup.call_count(), 2);
    }

    #[tokio::test]
    async fn test_fixture_lookup_failure() {
        let error = ProviderError::transport(ProviderId::Apollo, "connection reset");
        let lookup = FixtureLookup::new(ProviderId::Apollo).with_failure("acme.com", error.clone());
        let err = lookup
            .search(&CompanySeed::new("Acme", "acme.com"), 5)
            .await
            .unwrap_err();
        assert_eq!(err, error);
    }

    #[tokio::test]
    async fn test_fixture_verifier() {
        let verifier = FixtureVerifier::new()
            .with_status("bad@acme.com", EmailStatus::Invalid)
            .with_scored_status("all@acme.com", EmailStatus::CatchAll, "accept_all")
            .with_failure("boom@acme.com", ProviderError::transport(ProviderId::ZeroBounce, "down"));

        assert_eq!(verifier.verify("ok@acme.com").await.unwrap().status, EmailStatus::Valid);
        assert_eq!(verifier.verify("BAD@acme.com").await.unwrap().status, EmailStatus::Invalid);
        let all = verifier.verify("all@acme.com").await.unwrap();
        assert_eq!(all.quality_score.as_deref(), Some("accept_all"));
        assert!(verifier.verify("boom@acme.com").await.is_err());

        assert_eq!(
            verifier.checked(),
            vec!["ok@acme.com", "bad@acme.com", "all@acme.com", "boom@acme.com"]
        );
    }
}
