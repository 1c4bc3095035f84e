//! Candidate deduplication and merge.
//!
//! Candidates are grouped by [`DedupKey`]. Within a group, fields are filled
//! from the highest-priority provider first; a lower-priority member only
//! contributes fields the better ones left empty. Groups keep the order in
//! which their first member arrived, and the result is cut to the target.
//! A candidate with neither email nor name is kept as its own group.

use crate::core::{CandidateContact, DedupKey, ProviderId};
use std::collections::HashMap;

/// Merges duplicate candidates using a provider priority order.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    priority: Vec<ProviderId>,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(ProviderId::LOOKUPS.to_vec())
    }
}

impl Deduplicator {
    /// Creates a deduplicator with `priority`, highest first.
    #[must_use]
    pub fn new(priority: Vec<ProviderId>) -> Self {
        Self { priority }
    }

    /// The priority order in use.
    #[must_use]
    pub fn priority(&self) -> &[ProviderId] {
        &self.priority
    }

    /// Lower is better. Unlisted providers rank after listed ones, seed hints last.
    fn rank(&self, provider: ProviderId) -> usize {
        if provider == ProviderId::Seed {
            return usize::MAX;
        }
        self.priority
            .iter()
            .position(|p| *p == provider)
            .unwrap_or(self.priority.len())
    }

    /// Collapses `candidates` to at most `target` distinct contacts.
    #[must_use]
    pub fn dedupe(&self, candidates: Vec<CandidateContact>, target: usize) -> Vec<CandidateContact> {
        let mut order: Vec<DedupKey> = Vec::new();
        let mut groups: HashMap<DedupKey, Vec<CandidateContact>> = HashMap::new();
        for (arrival, candidate) in candidates.into_iter().enumerate() {
            let key = candidate
                .dedup_key()
                .unwrap_or(DedupKey::Anonymous(arrival));
            groups
                .entry(key.clone())
                .or_insert_with(|| {
                    order.push(key);
                    Vec::new()
                })
                .push(candidate);
        }

        order
            .into_iter()
            .take(target)
            .filter_map(|key| groups.remove(&key))
            .filter_map(|members| self.merge(members))
            .collect()
    }

    fn merge(&self, mut members: Vec<CandidateContact>) -> Option<CandidateContact> {
        // Stable sort keeps arrival order between members of equal rank.
        members.sort_by_key(|m| self.rank(m.source));
        members.into_iter().reduce(|mut merged, member| {
            fill(&mut merged.email, member.email);
            fill(&mut merged.name, member.name);
            fill(&mut merged.phone, member.phone);
            fill(&mut merged.linkedin_url, member.linkedin_url);
            fill(&mut merged.job_title, member.job_title);
            fill(&mut merged.department, member.department);
            fill(&mut merged.seniority, member.seniority);
            merged
        })
    }
}

fn fill(slot: &mut Option<String>, candidate: Option<String>) {
    let empty = slot.as_deref().map_or(true, |v| v.trim().is_empty());
    if empty {
        if let Some(value) = candidate.filter(|v| !v.trim().is_empty()) {
            *slot = Some(value);
        }
    }
}
