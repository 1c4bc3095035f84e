//! Run-level accounting: recorded errors, the error policy, and the final summary.

use super::state::WorkflowState;
use crate::core::{EnrichedContact, RunStatus};
use crate::errors::{EnrichError, ErrorKind};
use crate::utils::{generate_uuid, now_utc, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use uuid::Uuid;

/// How the engine reacts to a recorded error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Record the error and keep processing other companies.
    #[default]
    ContinueOnError,
    /// Stop the run at the first recorded error.
    FailFast,
}

impl ErrorPolicy {
    /// Maps the `continue_on_error` flag onto a policy.
    #[must_use]
    pub fn from_continue_on_error(continue_on_error: bool) -> Self {
        if continue_on_error {
            Self::ContinueOnError
        } else {
            Self::FailFast
        }
    }

    /// Returns true if any error stops the run.
    #[must_use]
    pub fn aborts_on_error(&self) -> bool {
        matches!(self, Self::FailFast)
    }
}

/// One recorded failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    /// The stage that failed.
    pub stage: WorkflowState,
    /// The company's domain, or its name when the domain is missing. `*` for run-wide failures.
    pub company: String,
    /// Human-readable detail.
    pub message: String,
    /// Error category.
    pub kind: ErrorKind,
}

impl RunError {
    /// Records `error` against `company` at `stage`.
    #[must_use]
    pub fn new(stage: WorkflowState, company: impl Into<String>, error: &EnrichError) -> Self {
        Self {
            stage,
            company: company.into(),
            message: error.to_string(),
            kind: error.kind(),
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.stage, self.company, self.message)
    }
}

/// Aggregate over one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique id of the run.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: Timestamp,
    /// When the run finished.
    pub finished_at: Option<Timestamp>,
    /// Seeds returned by the company source.
    pub companies_loaded: usize,
    /// Companies that went through every stage.
    pub companies_processed: usize,
    /// Contacts that reached at least one sink.
    pub contacts_enriched: usize,
    /// Persisted contacts whose email verified as valid.
    pub valid_emails: usize,
    /// Every recorded error, in company order.
    pub errors: Vec<RunError>,
    /// Overall outcome. Meaningful once finalized.
    pub status: RunStatus,
    /// Why the run stopped early, if it was aborted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halt_reason: Option<String>,
    /// True if cancellation left companies unprocessed.
    #[serde(default)]
    pub cancelled: bool,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl RunSummary {
    /// Starts an empty summary stamped with a fresh id and start time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: generate_uuid(),
            started_at: now_utc(),
            finished_at: None,
            companies_loaded: 0,
            companies_processed: 0,
            contacts_enriched: 0,
            valid_emails: 0,
            errors: Vec::new(),
            status: RunStatus::Success,
            halt_reason: None,
            cancelled: false,
        }
    }

    /// Appends a recorded error.
    pub fn record_error(&mut self, error: RunError) {
        self.errors.push(error);
    }

    /// Counts persisted contacts.
    pub fn record_persisted(&mut self, contacts: &[EnrichedContact]) {
        self.contacts_enriched += contacts.len();
        self.valid_emails += contacts.iter().filter(|c| c.is_valid_email).count();
    }

    /// Marks the run as aborted. The first reason wins.
    pub fn halt(&mut self, reason: impl Into<String>) {
        if self.halt_reason.is_none() {
            self.halt_reason = Some(reason.into());
        }
    }

    /// Returns true once the run has been aborted.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halt_reason.is_some()
    }

    /// Returns true if any error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Stamps the finish time and derives the status.
    ///
    /// Aborted runs are `failed`. Runs with errors, or with companies left
    /// unprocessed by cancellation, are `partial`. Everything else is `success`.
    pub fn finalize(&mut self) {
        self.finished_at = Some(now_utc());
        self.status = if self.is_halted() {
            RunStatus::Failed
        } else if self.has_errors() || self.cancelled {
            RunStatus::Partial
        } else {
            RunStatus::Success
        };
    }
}

/// What a run returns: the summary and every persisted contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    /// The finalized summary.
    pub summary: RunSummary,
    /// Persisted contacts, companies in processing order.
    pub contacts: Vec<EnrichedContact>,
}

impl RunOutcome {
    /// Renders the execution summary as printable lines.
    #[must_use]
    pub fn report(&self) -> String {
        let s = &self.summary;
        let rule = "=".repeat(60);
        let mut out = String::new();
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "EXECUTION SUMMARY");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Status: {}", s.status.to_string().to_uppercase());
        let _ = writeln!(
            out,
            "Companies processed: {}/{}",
            s.companies_processed, s.companies_loaded
        );
        let _ = writeln!(out, "Total contacts enriched: {}", s.contacts_enriched);
        let _ = writeln!(out, "Valid emails: {}/{}", s.valid_emails, s.contacts_enriched);
        let _ = writeln!(out, "Errors: {}", s.errors.len());
        for error in &s.errors {
            let _ = writeln!(out, "  - {error}");
        }
        if let Some(reason) = &s.halt_reason {
            let _ = writeln!(out, "Aborted: {reason}");
        }
        if s.cancelled {
            let _ = writeln!(out, "Cancelled before every company was processed");
        }
        let _ = write!(out, "{rule}");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ProviderError, ValidationError};
    use crate::core::ProviderId;

    fn provider_error() -> RunError {
        RunError::new(
            WorkflowState::Search,
            "acme.com",
            &EnrichError::from(ProviderError::transport(ProviderId::Lusha, "reset")),
        )
    }

    #[test]
    fn test_policy_from_flag() {
        assert_eq!(ErrorPolicy::from_continue_on_error(true), ErrorPolicy::ContinueOnError);
        assert_eq!(ErrorPolicy::from_continue_on_error(false), ErrorPolicy::FailFast);
        assert!(ErrorPolicy::FailFast.aborts_on_error());
        assert!(!ErrorPolicy::default().aborts_on_error());
    }

    #[test]
    fn test_run_error_from_enrich_error() {
        let error = RunError::new(
            WorkflowState::Load,
            "Acme",
            &EnrichError::from(ValidationError::new("Acme", "domain", "is empty")),
        );
        assert_eq!(error.kind, ErrorKind::Validation);
        assert_eq!(error.to_string(), "[load] Acme: Invalid company seed 'Acme': domain is empty");
        assert_eq!(provider_error().kind, ErrorKind::Provider);
    }

    #[test]
    fn test_finalize_status() {
        let mut clean = RunSummary::new();
        clean.finalize();
        assert_eq!(clean.status, RunStatus::Success);
        assert!(clean.finished_at.is_some());

        let mut with_errors = RunSummary::new();
        with_errors.record_error(provider_error());
        with_errors.finalize();
        assert_eq!(with_errors.status, RunStatus::Partial);

        let mut cancelled = RunSummary::new();
        cancelled.cancelled = true;
        cancelled.finalize();
        assert_eq!(cancelled.status, RunStatus::Partial);

        let mut halted = RunSummary::new();
        halted.record_error(provider_error());
        halted.halt("first");
        halted.halt("second");
        halted.finalize();
        assert_eq!(halted.status, RunStatus::Failed);
        assert_eq!(halted.halt_reason.as_deref(), Some("first"));
    }

    #[test]
    fn test_report_lines() {
        let mut summary = RunSummary::new();
        summary.companies_loaded = 2;
        summary.companies_processed = 2;
        summary.contacts_enriched = 7;
        summary.valid_emails = 5;
        summary.record_error(provider_error());
        summary.finalize();

        let report = RunOutcome {
            summary,
            contacts: Vec::new(),
        }
        .report();
        assert!(report.contains("Status: PARTIAL"));
        assert!(report.contains("Total contacts enriched: 7"));
        assert!(report.contains("Valid emails: 5/7"));
        assert!(report.contains("  - [search] acme.com: lusha request failed: reset"));
    }

    #[test]
    fn test_summary_serializes() {
        let mut summary = RunSummary::new();
        summary.record_error(provider_error());
        summary.finalize();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["status"], "partial");
        assert_eq!(json["errors"][0]["stage"], "search");
        assert_eq!(json["errors"][0]["kind"], "provider");
        assert!(json.get("halt_reason").is_none());
    }
}
