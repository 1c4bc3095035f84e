//! # Enrichflow
//!
//! A contact enrichment workflow engine.
//!
//! Enrichflow takes a list of company seeds and turns each one into a small,
//! verified set of contacts:
//!
//! - **Provider fan-out**: every lookup provider is queried concurrently per company
//! - **Deduplication**: candidates are merged by normalized email with a fixed provider priority
//! - **Verification**: each surviving email is checked once against the verification provider
//! - **Persistence**: the verified set is written to a document sink and a tabular sink
//! - **Error policy**: failures are isolated per company, or abort the run when configured to
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use enrichflow::prelude::*;
//!
//! let config = EnrichConfig::load(Some(Path::new("enrichflow.toml")))?;
//! let engine = WorkflowEngine::from_config(&config)?;
//! let outcome = engine.run().await;
//! println!("{}", outcome.summary.status);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod providers;
pub mod stages;
pub mod storage;
pub mod testing;
pub mod utils;
pub mod workflow;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{ContactFilters, EnrichConfig, LogLevel, StorageConfig};
    pub use crate::core::{
        CandidateContact, CompanySeed, ContactHints, EmailStatus, EnrichedContact, ProviderId,
        RunStatus, VerificationResult,
    };
    pub use crate::errors::{
        ConfigurationError, EnrichError, ProviderError, SinkError, SourceError, ValidationError,
    };
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::providers::{LookupProvider, VerificationProvider};
    pub use crate::stages::{Deduplicator, PersistenceSink, VerifierStage};
    pub use crate::storage::{CompanySource, DocumentSink, TabularSink};
    pub use crate::workflow::{
        ErrorPolicy, RunError, RunOutcome, RunSummary, WorkflowEngine, WorkflowState,
    };
}
