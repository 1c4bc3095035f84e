//! Builders for seeds, candidates and fixture providers.

use crate::core::{CandidateContact, CompanySeed, ProviderId};
use crate::providers::FixtureLookup;

/// Builds seeds from `(company_name, domain)` pairs.
#[must_use]
pub fn seeds(pairs: &[(&str, &str)]) -> Vec<CompanySeed> {
    pairs
        .iter()
        .map(|(name, domain)| CompanySeed::new(*name, *domain))
        .collect()
}

/// A candidate with a name and an email derived from it.
#[must_use]
pub fn candidate(provider: ProviderId, seed: &CompanySeed, local_part: &str) -> CandidateContact {
    CandidateContact::new(provider, seed)
        .with_name(local_part.replace('.', " "))
        .with_email(format!("{local_part}@{}", seed.normalized_domain()))
}

/// A fixture lookup returning `count` distinct contacts for every seed in `seeds`.
///
/// Emails are `<prefix><n>@<domain>`, so two providers built with the same
/// prefix return overlapping contacts.
#[must_use]
pub fn lookup_with_contacts(
    provider: ProviderId,
    seeds: &[CompanySeed],
    prefix: &str,
    count: usize,
) -> FixtureLookup {
    seeds.iter().fold(FixtureLookup::new(provider), |lookup, seed| {
        let contacts = (0..count)
            .map(|n| candidate(provider, seed, &format!("{prefix}{n}")))
            .collect();
        lookup.with_contacts(&seed.normalized_domain(), contacts)
    })
}
