//! Testing utilities for enrichflow workflows.
//!
//! This module provides:
//! - In-memory company sources and sinks
//! - Builders for seeds, candidates and fixture providers

mod fixtures;
mod mocks;

pub use fixtures::{candidate, lookup_with_contacts, seeds};
pub use mocks::{MemoryCompanySource, MemoryDocumentSink, MemoryTabularSink};
