//! Concurrent fan-out to the lookup providers.

use crate::core::{CandidateContact, CompanySeed};
use crate::errors::ProviderError;
use crate::providers::LookupProvider;
use futures::future::join_all;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Everything the lookup providers returned for one company.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Candidates from the providers that succeeded, in provider list order.
    pub candidates: Vec<CandidateContact>,
    /// One error per provider that failed.
    pub failures: Vec<ProviderError>,
}

impl SearchOutcome {
    /// Returns true if every provider failed.
    #[must_use]
    pub fn all_failed(&self, provider_count: usize) -> bool {
        provider_count > 0 && self.failures.len() == provider_count
    }
}

/// Queries every provider concurrently for `seed`.
///
/// Each call is bounded by `call_timeout`. Slow or failing providers do not
/// hold back the others; every call resolves before this returns.
pub async fn search_all(
    providers: &[LookupProvider],
    seed: &CompanySeed,
    limit: usize,
    call_timeout: Duration,
) -> SearchOutcome {
    let calls = providers.iter().map(|provider| async move {
        match timeout(call_timeout, provider.search(seed, limit)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                provider: provider.id(),
                timeout_ms: u64::try_from(call_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    });

    let mut outcome = SearchOutcome::default();
    for (provider, result) in providers.iter().zip(join_all(calls).await) {
        match result {
            Ok(found) => {
                debug!(provider = %provider.id(), company = %seed.label(), found = found.len(), "Provider search succeeded");
                outcome.candidates.extend(found);
            }
            Err(error) => outcome.failures.push(error),
        }
    }
    outcome
}
