//! The workflow engine: drives every company through the stage sequence.

use super::state::{StateMachine, WorkflowState};
use super::summary::{ErrorPolicy, RunError, RunOutcome, RunSummary};
use crate::cancellation::CancellationToken;
use crate::config::EnrichConfig;
use crate::core::{CandidateContact, CompanySeed, EnrichedContact, ProviderId};
use crate::errors::{ConfigurationError, EnrichError};
use crate::events::{
    EventSink, NoOpEventSink, COMPANY_COMPLETED, COMPANY_STARTED, RUN_CANCELLED, RUN_COMPLETED,
    RUN_STARTED, STAGE_COMPLETED, STAGE_FAILED,
};
use crate::providers::{LookupProvider, VerificationProvider};
use crate::stages::{search_all, Deduplicator, PersistenceSink, VerifierStage};
use crate::storage::{
    CompanySource, CsvCompanySource, CsvTabularSink, JsonLinesDocumentSink,
};
use futures::future::join_all;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// One company's progress through a batch.
#[derive(Debug)]
struct CompanyRun {
    seed: CompanySeed,
    machine: StateMachine,
    /// Errors already reported.
    errors: Vec<RunError>,
    /// Errors raised by the stage in progress.
    pending: Vec<RunError>,
    rejected: bool,
    candidates: Vec<CandidateContact>,
    verified: Vec<EnrichedContact>,
    persisted: Vec<EnrichedContact>,
}

impl CompanyRun {
    fn new(seed: CompanySeed) -> Self {
        Self {
            seed,
            machine: StateMachine::new(),
            errors: Vec::new(),
            pending: Vec::new(),
            rejected: false,
            candidates: Vec::new(),
            verified: Vec::new(),
            persisted: Vec::new(),
        }
    }

    fn at(&self, stage: WorkflowState) -> bool {
        self.machine.state() == stage
    }

    fn record(&mut self, stage: WorkflowState, error: impl Into<EnrichError>) {
        let error = RunError::new(stage, self.seed.label(), &error.into());
        self.pending.push(error);
    }
}

/// Runs company seeds through `LOAD → SEARCH → DEDUPE → VERIFY → PERSIST`.
///
/// Companies are taken in batches of `batch_size`. Within a batch every
/// company runs the same stage concurrently, and the next stage starts only
/// once the current one has resolved for all of them. Errors are handled per
/// [`ErrorPolicy`] and the optional `max_errors` budget.
pub struct WorkflowEngine {
    config: EnrichConfig,
    policy: ErrorPolicy,
    source: Arc<dyn CompanySource>,
    lookups: Vec<LookupProvider>,
    verifier: VerifierStage,
    sink: PersistenceSink,
    deduplicator: Deduplicator,
    events: Arc<dyn EventSink>,
    cancel: Arc<CancellationToken>,
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine")
            .field("policy", &self.policy)
            .field("batch_size", &self.config.batch_size)
            .field("lookups", &self.lookup_ids())
            .field("source", &self.source)
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}

impl WorkflowEngine {
    /// Creates an engine from explicit collaborators.
    ///
    /// The configuration is validated, credentials excepted, since the
    /// collaborators are already built.
    pub fn new(
        config: EnrichConfig,
        source: Arc<dyn CompanySource>,
        lookups: Vec<LookupProvider>,
        verifier: VerificationProvider,
        sink: PersistenceSink,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        if lookups.is_empty() {
            return Err(ConfigurationError::invalid(
                "provider_priority",
                "at least one lookup provider is required",
            ));
        }
        Ok(Self {
            policy: config.error_policy(),
            verifier: VerifierStage::new(verifier, config.api_timeout()),
            deduplicator: Deduplicator::new(config.provider_priority.clone()),
            source,
            lookups,
            sink,
            events: Arc::new(NoOpEventSink),
            cancel: CancellationToken::shared(),
            config,
        })
    }

    /// Builds the CSV source, the HTTP providers and the file sinks named by `config`.
    pub fn from_config(config: &EnrichConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        config.validate_credentials()?;
        let source = Arc::new(CsvCompanySource::new(&config.storage.companies_path));
        let lookups = LookupProvider::all_from_config(config)?;
        let verifier = VerificationProvider::from_config(config)?;
        let sink = PersistenceSink::new(
            Arc::new(JsonLinesDocumentSink::new(&config.storage.documents_path)),
            Arc::new(CsvTabularSink::new(&config.storage.sheet_path)),
        );
        Self::new(config.clone(), source, lookups, verifier, sink)
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Shares an externally owned cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: Arc<CancellationToken>) -> Self {
        self.cancel = token;
        self
    }

    /// The token that stops the run from launching new companies.
    #[must_use]
    pub fn cancellation_token(&self) -> Arc<CancellationToken> {
        Arc::clone(&self.cancel)
    }

    /// The error policy in effect.
    #[must_use]
    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    fn lookup_ids(&self) -> Vec<ProviderId> {
        self.lookups.iter().map(LookupProvider::id).collect()
    }

    /// Executes one run.
    ///
    /// Never returns an error: every failure after construction ends up in
    /// the summary's `errors` and is reflected in its status.
    pub async fn run(&self) -> RunOutcome {
        let mut summary = RunSummary::new();
        let mut contacts = Vec::new();

        info!(
            run_id = %summary.run_id,
            providers = ?self.lookup_ids(),
            batch_size = self.config.batch_size,
            policy = ?self.policy,
            "Starting enrichment run"
        );
        self.events
            .emit(RUN_STARTED, Some(json!({ "run_id": summary.run_id.to_string() })))
            .await;

        match self.source.load().await {
            Ok(seeds) => self.process(seeds, &mut summary, &mut contacts).await,
            Err(err) => {
                let error = RunError::new(WorkflowState::Load, "*", &err.into());
                self.report_error(&error, true).await;
                summary.record_error(error);
                summary.halt("company source could not be loaded");
            }
        }

        summary.finalize();
        info!(
            run_id = %summary.run_id,
            status = %summary.status,
            companies = summary.companies_processed,
            contacts = summary.contacts_enriched,
            errors = summary.errors.len(),
            "Enrichment run finished"
        );
        self.events
            .emit(RUN_COMPLETED, serde_json::to_value(&summary).ok())
            .await;

        RunOutcome { summary, contacts }
    }

    async fn process(
        &self,
        seeds: Vec<CompanySeed>,
        summary: &mut RunSummary,
        contacts: &mut Vec<EnrichedContact>,
    ) {
        summary.companies_loaded = seeds.len();
        info!(companies = seeds.len(), "Loaded company seeds");

        let batch_size = self.config.batch_size.max(1);
        for (index, batch) in seeds.chunks(batch_size).enumerate() {
            if self.cancel.is_cancelled() {
                let skipped = seeds.len() - index * batch_size;
                let reason = self.cancel.reason();
                summary.cancelled = true;
                warn!(skipped, reason = ?reason, "Run cancelled, remaining companies skipped");
                self.events
                    .emit(RUN_CANCELLED, Some(json!({ "skipped": skipped, "reason": reason })))
                    .await;
                break;
            }

            let (runs, halt) = self.run_batch(batch, summary.errors.len()).await;
            for run in runs {
                if run.machine.state() == WorkflowState::Done {
                    summary.companies_processed += 1;
                }
                summary.errors.extend(run.errors);
                summary.record_persisted(&run.persisted);
                contacts.extend(run.persisted);
            }
            if let Some(reason) = halt {
                error!(reason = %reason, "Aborting enrichment run");
                summary.halt(reason);
                break;
            }
        }
    }

    /// Runs one batch stage by stage. Returns the finished runs in seed order
    /// and the abort reason, if the batch tripped the error policy.
    async fn run_batch(
        &self,
        batch: &[CompanySeed],
        recorded: usize,
    ) -> (Vec<CompanyRun>, Option<String>) {
        let mut runs: Vec<CompanyRun> = batch.iter().cloned().map(CompanyRun::new).collect();
        for run in &mut runs {
            self.events
                .emit(COMPANY_STARTED, Some(json!({ "company": run.seed.label() })))
                .await;
            if let Err(err) = run.seed.validate() {
                run.record(WorkflowState::Load, err);
                run.rejected = true;
            }
        }

        let mut halt = self.resolve_stage(WorkflowState::Load, &mut runs, recorded).await;
        for stage in WorkflowState::COMPANY_STAGES {
            if halt.is_some() {
                break;
            }
            match stage {
                WorkflowState::Search => self.search(&mut runs).await,
                WorkflowState::Dedupe => self.dedupe(&mut runs),
                WorkflowState::Verify => self.verify(&mut runs).await,
                _ => self.persist(&mut runs).await,
            }
            halt = self.resolve_stage(stage, &mut runs, recorded).await;
        }
        (runs, halt)
    }

    async fn search(&self, runs: &mut [CompanyRun]) {
        let active: Vec<&mut CompanyRun> = runs
            .iter_mut()
            .filter(|run| run.at(WorkflowState::Search))
            .collect();
        let limit = self.config.people_per_company;
        let timeout = self.config.api_timeout();
        let outcomes = join_all(
            active
                .iter()
                .map(|run| search_all(&self.lookups, &run.seed, limit, timeout)),
        )
        .await;

        for (run, outcome) in active.into_iter().zip(outcomes) {
            if outcome.all_failed(self.lookups.len()) {
                warn!(company = %run.seed.label(), "Every lookup provider failed");
            }
            for failure in outcome.failures {
                run.record(WorkflowState::Search, failure);
            }
            run.candidates = outcome.candidates;
            run.candidates.extend(CandidateContact::from_hints(&run.seed));
        }
    }

    fn dedupe(&self, runs: &mut [CompanyRun]) {
        let target = self.config.people_per_company;
        for run in runs.iter_mut().filter(|run| run.at(WorkflowState::Dedupe)) {
            let found = run.candidates.len();
            run.candidates = self
                .deduplicator
                .dedupe(std::mem::take(&mut run.candidates), target);
            debug!(
                company = %run.seed.label(),
                candidates = found,
                kept = run.candidates.len(),
                "Deduplicated candidates"
            );
        }
    }

    async fn verify(&self, runs: &mut [CompanyRun]) {
        let mut active: Vec<&mut CompanyRun> = runs
            .iter_mut()
            .filter(|run| run.at(WorkflowState::Verify))
            .collect();
        let inputs: Vec<Vec<CandidateContact>> = active
            .iter_mut()
            .map(|run| std::mem::take(&mut run.candidates))
            .collect();
        let batches = join_all(
            inputs
                .into_iter()
                .map(|candidates| self.verifier.verify_batch(candidates)),
        )
        .await;

        for (run, batch) in active.into_iter().zip(batches) {
            for failure in batch.failures {
                run.record(WorkflowState::Verify, failure);
            }
            run.verified = batch.contacts;
        }
    }

    async fn persist(&self, runs: &mut [CompanyRun]) {
        let mut active: Vec<&mut CompanyRun> = runs
            .iter_mut()
            .filter(|run| run.at(WorkflowState::Persist))
            .collect();
        let inputs: Vec<Vec<EnrichedContact>> = active
            .iter_mut()
            .map(|run| std::mem::take(&mut run.verified))
            .collect();
        let outcomes = join_all(inputs.into_iter().map(|contacts| self.sink.persist(contacts))).await;

        for (run, outcome) in active.into_iter().zip(outcomes) {
            for failure in outcome.failures() {
                run.record(WorkflowState::Persist, failure);
            }
            if outcome.persisted() > 0 {
                run.persisted = outcome.contacts;
            }
        }
    }

    /// Reports the errors `stage` raised, decides whether the run stops,
    /// and moves every company at `stage` to its next state.
    async fn resolve_stage(
        &self,
        stage: WorkflowState,
        runs: &mut [CompanyRun],
        recorded: usize,
    ) -> Option<String> {
        let raised: usize = runs.iter().map(|run| run.pending.len()).sum();
        let total = recorded + raised + runs.iter().map(|run| run.errors.len()).sum::<usize>();
        let halt = self.halt_reason(raised, total);

        for run in runs.iter_mut().filter(|run| run.at(stage)) {
            let pending = std::mem::take(&mut run.pending);
            for error in &pending {
                self.report_error(error, halt.is_some()).await;
            }
            self.events
                .emit(
                    STAGE_COMPLETED,
                    Some(json!({
                        "company": run.seed.label(),
                        "stage": stage,
                        "errors": pending.len(),
                    })),
                )
                .await;
            run.errors.extend(pending);

            let next = if halt.is_some() || run.rejected {
                run.machine.fail();
                WorkflowState::Failed
            } else {
                run.machine.advance().unwrap_or(WorkflowState::Failed)
            };
            if next.is_terminal() {
                self.events
                    .emit(
                        COMPANY_COMPLETED,
                        Some(json!({
                            "company": run.seed.label(),
                            "state": next,
                            "contacts": run.persisted.len(),
                        })),
                    )
                    .await;
            }
        }
        halt
    }

    fn halt_reason(&self, raised: usize, total: usize) -> Option<String> {
        if raised > 0 && self.policy.aborts_on_error() {
            return Some("an error was recorded and continue_on_error is disabled".to_string());
        }
        match self.config.max_errors {
            Some(max) if raised > 0 && total >= max => {
                Some(format!("error budget exhausted ({total} errors, max_errors = {max})"))
            }
            _ => None,
        }
    }

    async fn report_error(&self, error: &RunError, aborting: bool) {
        if aborting {
            error!(stage = %error.stage, company = %error.company, message = %error.message, "Stage failed");
        } else {
            warn!(stage = %error.stage, company = %error.company, message = %error.message, "Stage failed, continuing");
        }
        self.events
            .emit(STAGE_FAILED, serde_json::to_value(error).ok())
            .await;
    }
}
