//! Contacts as they move through the workflow: provider candidates,
//! verification verdicts, and the final enriched record.

use super::company::CompanySeed;
use super::status::EmailStatus;
use crate::utils::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a contact data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    /// Cognism B2B search.
    Cognism,
    /// Lusha prospecting search.
    Lusha,
    /// Apollo people search.
    Apollo,
    /// `ZeroBounce` email verification.
    #[serde(rename = "zerobounce")]
    ZeroBounce,
    /// Contact hints carried on the company seed itself.
    Seed,
}

impl ProviderId {
    /// The three lookup providers, in default priority order.
    pub const LOOKUPS: [Self; 3] = [Self::Cognism, Self::Lusha, Self::Apollo];

    /// Returns true for providers that answer contact searches.
    #[must_use]
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Cognism | Self::Lusha | Self::Apollo)
    }

    /// The lowercase identifier used in logs, documents and rows.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cognism => "cognism",
            Self::Lusha => "lusha",
            Self::Apollo => "apollo",
            Self::ZeroBounce => "zerobounce",
            Self::Seed => "seed",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key identifying one logical contact within a company's candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    /// Normalized (trimmed, lowercased) email.
    Email(String),
    /// Normalized name and domain, for candidates without an email.
    NameDomain(String, String),
    /// Arrival position of a candidate with neither email nor name. It
    /// never matches another candidate.
    Anonymous(usize),
}

/// One unverified contact returned by one provider for one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateContact {
    /// The provider that returned this candidate.
    pub source: ProviderId,
    /// Work email.
    pub email: Option<String>,
    /// Full name.
    pub name: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// `LinkedIn` profile URL.
    pub linkedin_url: Option<String>,
    /// Job title.
    pub job_title: Option<String>,
    /// Department.
    pub department: Option<String>,
    /// Seniority level.
    pub seniority: Option<String>,
    /// Domain of the seed this candidate was found for.
    pub domain: String,
    /// Name of the seed this candidate was found for.
    pub company_name: String,
}

impl CandidateContact {
    /// Creates an empty candidate attributed to `source` for `seed`.
    #[must_use]
    pub fn new(source: ProviderId, seed: &CompanySeed) -> Self {
        Self {
            source,
            email: None,
            name: None,
            phone: None,
            linkedin_url: None,
            job_title: None,
            department: None,
            seniority: None,
            domain: seed.normalized_domain(),
            company_name: seed.company_name.trim().to_string(),
        }
    }

    /// Builds a candidate out of the seed's contact hints, if they name a person.
    #[must_use]
    pub fn from_hints(seed: &CompanySeed) -> Option<Self> {
        if !seed.hints.identifies_person() {
            return None;
        }
        let hints = seed.hints.clone();
        Some(Self {
            email: hints.email,
            name: hints.name,
            phone: hints.phone,
            linkedin_url: hints.linkedin_url,
            job_title: hints.job_title,
            department: hints.department,
            seniority: hints.seniority,
            ..Self::new(ProviderId::Seed, seed)
        })
    }

    /// Sets the email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the job title.
    #[must_use]
    pub fn with_job_title(mut self, title: impl Into<String>) -> Self {
        self.job_title = Some(title.into());
        self
    }

    /// Sets the `LinkedIn` URL.
    #[must_use]
    pub fn with_linkedin_url(mut self, url: impl Into<String>) -> Self {
        self.linkedin_url = Some(url.into());
        self
    }

    /// Returns the trimmed, lowercased email, or `None` if absent or blank.
    #[must_use]
    pub fn normalized_email(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
    }

    /// Computes the key this candidate deduplicates under.
    ///
    /// Returns `None` when there is neither an email nor a name to match on.
    #[must_use]
    pub fn dedup_key(&self) -> Option<DedupKey> {
        if let Some(email) = self.normalized_email() {
            return Some(DedupKey::Email(email));
        }
        let name = self
            .name
            .as_deref()
            .map(|n| n.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
            .filter(|n| !n.is_empty())?;
        Some(DedupKey::NameDomain(name, self.domain.trim().to_lowercase()))
    }
}

/// A verification provider's verdict for one email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// The email that was checked.
    pub email: String,
    /// The normalized verdict.
    pub status: EmailStatus,
    /// Provider-specific detail (sub-status or score).
    pub quality_score: Option<String>,
}

impl VerificationResult {
    /// Creates a new verification result.
    #[must_use]
    pub fn new(email: impl Into<String>, status: EmailStatus) -> Self {
        Self {
            email: email.into(),
            status,
            quality_score: None,
        }
    }

    /// Sets the quality score.
    #[must_use]
    pub fn with_quality_score(mut self, score: impl Into<String>) -> Self {
        self.quality_score = Some(score.into());
        self
    }
}

/// The unit of record: a deduplicated, verified contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedContact {
    /// Name of the seed company.
    pub company_name: String,
    /// Domain of the seed company.
    pub domain: String,
    /// Full name.
    pub name: Option<String>,
    /// Work email.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// `LinkedIn` profile URL.
    pub linkedin_url: Option<String>,
    /// Job title.
    pub job_title: Option<String>,
    /// Department.
    pub department: Option<String>,
    /// Seniority level.
    pub seniority: Option<String>,
    /// Verification verdict.
    pub email_status: EmailStatus,
    /// Provider-specific verification detail.
    pub email_quality_score: Option<String>,
    /// True only when `email_status` is `valid`.
    pub is_valid_email: bool,
    /// The highest-priority provider that contributed to this contact.
    pub enrichment_source: ProviderId,
    /// When the contact was handed to the persistence sinks.
    pub stored_at: Option<Timestamp>,
}

impl EnrichedContact {
    /// Builds an unverified record from a merged candidate.
    #[must_use]
    pub fn unverified(candidate: CandidateContact) -> Self {
        Self {
            company_name: candidate.company_name,
            domain: candidate.domain,
            name: candidate.name,
            email: candidate.email,
            phone: candidate.phone,
            linkedin_url: candidate.linkedin_url,
            job_title: candidate.job_title,
            department: candidate.department,
            seniority: candidate.seniority,
            email_status: EmailStatus::Unknown,
            email_quality_score: None,
            is_valid_email: false,
            enrichment_source: candidate.source,
            stored_at: None,
        }
    }

    /// Builds a record from a merged candidate and its verification verdict.
    #[must_use]
    pub fn verified(candidate: CandidateContact, result: VerificationResult) -> Self {
        Self {
            email_status: result.status,
            is_valid_email: result.status.is_valid(),
            email_quality_score: result.quality_score,
            ..Self::unverified(candidate)
        }
    }

    /// Returns the record stamped with its persistence time.
    #[must_use]
    pub fn stored(mut self, at: Timestamp) -> Self {
        self.stored_at = Some(at);
        self
    }
}
