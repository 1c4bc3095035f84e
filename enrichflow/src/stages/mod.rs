//! The per-company stages: search, dedupe, verify, persist.
//!
//! Each stage is a plain async function or struct that returns its results
//! together with any errors it hit. Stages never decide whether the run
//! continues; the workflow engine applies the error policy.

mod dedupe;
mod persist;
mod search;
mod verify;

pub use dedupe::Deduplicator;
pub use persist::{PersistOutcome, PersistenceSink};
pub use search::{search_all, SearchOutcome};
pub use verify::{VerificationBatch, VerifierStage};
