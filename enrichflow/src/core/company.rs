//! Company seeds, the input unit of a run.

use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};

/// Contact details already known for a company before enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactHints {
    /// Full name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// `LinkedIn` profile URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    /// Job title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    /// Department.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Seniority level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seniority: Option<String>,
}

impl ContactHints {
    /// Returns true if no hint carries a usable value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [
            &self.name,
            &self.email,
            &self.phone,
            &self.linkedin_url,
            &self.job_title,
            &self.department,
            &self.seniority,
        ]
        .iter()
        .all(|v| v.as_deref().map_or(true, |s| s.trim().is_empty()))
    }

    /// Returns true if the hints identify a person (name or email).
    #[must_use]
    pub fn identifies_person(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.name) || present(&self.email)
    }
}

/// A company to enrich. Read-only for the duration of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySeed {
    /// Display name of the company.
    pub company_name: String,
    /// Company web domain; the join and dedup key for the company.
    pub domain: String,
    /// Pre-known contact details, if any.
    #[serde(default)]
    pub hints: ContactHints,
}

impl CompanySeed {
    /// Creates a new seed.
    #[must_use]
    pub fn new(company_name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            domain: domain.into(),
            hints: ContactHints::default(),
        }
    }

    /// Sets the contact hints.
    #[must_use]
    pub fn with_hints(mut self, hints: ContactHints) -> Self {
        self.hints = hints;
        self
    }

    /// Returns the domain trimmed and lowercased.
    #[must_use]
    pub fn normalized_domain(&self) -> String {
        self.domain.trim().to_lowercase()
    }

    /// Label used to attribute errors: the normalized domain, matching
    /// [`EnrichedContact::domain`](super::EnrichedContact), or the name when
    /// the domain is missing.
    #[must_use]
    pub fn label(&self) -> String {
        let domain = self.normalized_domain();
        if domain.is_empty() {
            self.company_name.trim().to_string()
        } else {
            domain
        }
    }

    /// Checks that the seed carries the fields the workflow depends on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.domain.trim().is_empty() {
            return Err(ValidationError::new(&self.company_name, "domain", "is empty"));
        }
        if self.domain.trim().contains(char::is_whitespace) {
            return Err(ValidationError::new(
                &self.company_name,
                "domain",
                format!("'{}' contains whitespace", self.domain.trim()),
            ));
        }
        if self.company_name.trim().is_empty() {
            return Err(ValidationError::new(self.domain.trim(), "company_name", "is empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_validate_ok() {
        let seed = CompanySeed::new("Acme", "acme.com");
        assert!(seed.validate().is_ok());
    }

    #[test]
    fn test_seed_validate_missing_domain() {
        let seed = CompanySeed::new("Acme", "   ");
        let err = seed.validate().unwrap_err();
        assert_eq!(err.field, "domain");
        assert_eq!(err.company, "Acme");
        assert_eq!(seed.label(), "Acme");
    }

    #[test]
    fn test_seed_validate_missing_name() {
        let seed = CompanySeed::new("", "acme.com");
        let err = seed.validate().unwrap_err();
        assert_eq!(err.field, "company_name");
    }

    #[test]
    fn test_seed_validate_whitespace_domain() {
        let seed = CompanySeed::new("Acme", "acme .com");
        assert!(seed.validate().is_err());
    }

    #[test]
    fn test_normalized_domain() {
        let seed = CompanySeed::new("Acme", "  ACME.com ");
        assert_eq!(seed.normalized_domain(), "acme.com");
        assert_eq!(seed.label(), "acme.com");
    }

    #[test]
    fn test_hints_empty() {
        assert!(ContactHints::default().is_empty());

        let hints = ContactHints {
            phone: Some("  ".to_string()),
            ..ContactHints::default()
        };
        assert!(hints.is_empty());
        assert!(!hints.identifies_person());

        let hints = ContactHints {
            email: Some("ceo@acme.com".to_string()),
            ..ContactHints::default()
        };
        assert!(!hints.is_empty());
        assert!(hints.identifies_person());
    }

    #[test]
    fn test_seed_deserialize_without_hints() {
        let seed: CompanySeed =
            serde_json::from_str(r#"{"company_name": "Acme", "domain": "acme.com"}"#).unwrap();
        assert_eq!(seed.hints, ContactHints::default());
    }
}
