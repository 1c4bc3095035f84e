//! Stop signal shared between a run and whoever started it.

use std::sync::{Arc, OnceLock};
use tracing::info;

/// A one-shot stop signal.
///
/// Only the first call to [`CancellationToken::cancel`] has an effect; its
/// reason is kept for the run summary and the logs.
#[derive(Debug, Default)]
pub struct CancellationToken {
    reason: OnceLock<String>,
}

impl CancellationToken {
    /// Creates a token that is not raised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token ready to hand to an engine and a signal handler.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Raises the token. Returns false if it was already raised.
    pub fn cancel(&self, reason: impl Into<String>) -> bool {
        let raised = self.reason.set(reason.into()).is_ok();
        if raised {
            info!(reason = ?self.reason.get(), "Cancellation requested");
        }
        raised
    }

    /// Returns true once the token is raised.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.reason.get().is_some()
    }

    /// The reason given to the first `cancel` call.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.get().cloned()
    }
}
