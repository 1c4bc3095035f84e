//! Cooperative cancellation for workflow runs.
//!
//! A [`CancellationToken`] is shared between the caller and the engine. Once
//! raised, the engine stops launching new companies and lets the ones in
//! flight drain.

mod token;

pub use token::CancellationToken;
