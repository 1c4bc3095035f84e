//! Workflow execution.
//!
//! This module provides:
//! - The per-company state machine
//! - The run summary and error policy
//! - The engine sequencing every stage over a batch of companies

mod engine;
mod state;
mod summary;

pub use engine::WorkflowEngine;
pub use state::{StateMachine, TransitionError, WorkflowState};
pub use summary::{ErrorPolicy, RunError, RunOutcome, RunSummary};
