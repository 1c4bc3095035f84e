//! Workflow lifecycle events.
//!
//! The engine reports progress through an [`EventSink`] handed to it at
//! construction. Event names are dotted (`company.started`,
//! `stage.failed`, ...) and carry a JSON payload.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, RecordedEvent};

/// A run began.
pub const RUN_STARTED: &str = "run.started";
/// A run finished (any status).
pub const RUN_COMPLETED: &str = "run.completed";
/// The cancellation token stopped the run early.
pub const RUN_CANCELLED: &str = "run.cancelled";
/// A company entered the pipeline.
pub const COMPANY_STARTED: &str = "company.started";
/// A company left the pipeline.
pub const COMPANY_COMPLETED: &str = "company.completed";
/// A stage resolved for a company.
pub const STAGE_COMPLETED: &str = "stage.completed";
/// A stage recorded an error for a company.
pub const STAGE_FAILED: &str = "stage.failed";
