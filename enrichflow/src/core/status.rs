//! Email verification and run status enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict on a contact's email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    /// The mailbox exists and accepts mail.
    Valid,
    /// The address bounces or is malformed.
    Invalid,
    /// The domain accepts every address, so the mailbox cannot be confirmed.
    CatchAll,
    /// No verdict: missing email, failed verification, or an inconclusive answer.
    #[default]
    Unknown,
}

impl EmailStatus {
    /// Maps a verification provider's status string onto the closed set.
    ///
    /// Accepts `catch-all`, `catch_all` and `catchall` spellings. Anything
    /// unrecognised (`unknown`, `spamtrap`, `abuse`, `do_not_mail`, ...) maps
    /// to [`EmailStatus::Unknown`].
    #[must_use]
    pub fn from_provider_status(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "valid" => Self::Valid,
            "invalid" => Self::Invalid,
            "catch-all" | "catch_all" | "catchall" => Self::CatchAll,
            _ => Self::Unknown,
        }
    }

    /// Returns true only for [`EmailStatus::Valid`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Invalid => write!(f, "invalid"),
            Self::CatchAll => write!(f, "catch_all"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every company went through every stage without a recorded error.
    #[default]
    Success,
    /// The run finished but recorded errors or was cancelled early.
    Partial,
    /// The run was aborted.
    Failed,
}

impl RunStatus {
    /// Returns true if the process should exit successfully.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success | Self::Partial)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Partial => write!(f, "partial"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
