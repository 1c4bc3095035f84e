//! Core data model: company seeds, candidate and enriched contacts, and
//! the status enums shared by every stage.

mod company;
mod contact;
mod status;

pub use company::{CompanySeed, ContactHints};
pub use contact::{CandidateContact, DedupKey, EnrichedContact, ProviderId, VerificationResult};
pub use status::{EmailStatus, RunStatus};
