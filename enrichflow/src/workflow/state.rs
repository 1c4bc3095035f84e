//! Per-company workflow states and their allowed transitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A stage of the enrichment workflow.
///
/// Companies move through `Load → Search → Dedupe → Verify → Persist → Done`
/// in that order. `Failed` is reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// The seed is loaded and validated.
    Load,
    /// Lookup providers are queried.
    Search,
    /// Candidates are merged.
    Dedupe,
    /// Emails are verified.
    Verify,
    /// Contacts are written to the sinks.
    Persist,
    /// Every stage resolved.
    Done,
    /// The company was stopped.
    Failed,
}

impl WorkflowState {
    /// The stages the engine runs after a seed is loaded, in order.
    pub const COMPANY_STAGES: [Self; 4] = [Self::Search, Self::Dedupe, Self::Verify, Self::Persist];

    /// The successor on the success path, if any.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Load => Some(Self::Search),
            Self::Search => Some(Self::Dedupe),
            Self::Dedupe => Some(Self::Verify),
            Self::Verify => Some(Self::Persist),
            Self::Persist => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    /// Returns true for `Done` and `Failed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if `to` may follow this state.
    #[must_use]
    pub fn can_transition_to(&self, to: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == Self::Failed || self.next() == Some(to)
    }

    /// Lowercase stage name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Search => "search",
            Self::Dedupe => "dedupe",
            Self::Verify => "verify",
            Self::Persist => "persist",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected state change.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("invalid transition from {from} to {to}")]
pub struct TransitionError {
    /// State before the attempted change.
    pub from: WorkflowState,
    /// Requested state.
    pub to: WorkflowState,
}

/// Tracks one company's position in the workflow.
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: WorkflowState,
    history: Vec<WorkflowState>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Starts at `Load`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: WorkflowState::Load,
            history: vec![WorkflowState::Load],
        }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Every state visited, in order, including the current one.
    #[must_use]
    pub fn history(&self) -> &[WorkflowState] {
        &self.history
    }

    /// Returns true once `Done` or `Failed` is reached.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Moves to `to` if the transition is allowed.
    pub fn transition(&mut self, to: WorkflowState) -> Result<(), TransitionError> {
        if !self.state.can_transition_to(to) {
            return Err(TransitionError {
                from: self.state,
                to,
            });
        }
        self.state = to;
        self.history.push(to);
        Ok(())
    }

    /// Moves along the success path. Returns the new state, or `None` if terminal.
    pub fn advance(&mut self) -> Option<WorkflowState> {
        let next = self.state.next()?;
        self.state = next;
        self.history.push(next);
        Some(next)
    }

    /// Moves to `Failed`. Returns false if already terminal.
    pub fn fail(&mut self) -> bool {
        self.transition(WorkflowState::Failed).is_ok()
    }
}
