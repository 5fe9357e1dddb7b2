//! Per-attempt memory of candidate names the user already passed over
//!
//! The ledger lives for one scan target's resolution attempt. Membership
//! only grows; it is dropped together with its `SearchContext`.

use crate::models::{CandidateSummary, ScanTarget};
use std::collections::BTreeSet;

/// Set of rejected candidate names
#[derive(Debug, Clone, Default)]
pub struct ExclusionLedger {
    names: BTreeSet<String>,
}

/// Result of filtering a candidate list against the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredCandidates {
    pub candidates: Vec<CandidateSummary>,
    /// Filtering removed everything, so the unfiltered list was restored
    pub reverted: bool,
}

impl ExclusionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a name; returns true if it was not present yet
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    /// Record every candidate's name
    pub fn extend_from<'a, I>(&mut self, candidates: I)
    where
        I: IntoIterator<Item = &'a CandidateSummary>,
    {
        for candidate in candidates {
            self.names.insert(candidate.name.clone());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }

    /// Drop candidates whose name is in the ledger
    ///
    /// If that would turn a non-empty list into an empty one, the original
    /// list is returned unchanged instead: exclusion filtering alone never
    /// produces an empty result.
    pub fn filter(&self, candidates: Vec<CandidateSummary>) -> FilteredCandidates {
        if candidates.is_empty() || self.names.is_empty() {
            return FilteredCandidates {
                candidates,
                reverted: false,
            };
        }

        let kept: Vec<CandidateSummary> = candidates
            .iter()
            .filter(|c| !self.names.contains(&c.name))
            .cloned()
            .collect();

        if kept.is_empty() {
            FilteredCandidates {
                candidates,
                reverted: true,
            }
        } else {
            FilteredCandidates {
                candidates: kept,
                reverted: false,
            }
        }
    }
}

/// State of one scan target's resolution attempt
///
/// Shared by the primary and secondary provider rounds of that attempt.
#[derive(Debug, Clone)]
pub struct SearchContext {
    pub target: ScanTarget,
    pub excluded_names: ExclusionLedger,
}

impl SearchContext {
    pub fn new(target: ScanTarget) -> Self {
        Self {
            target,
            excluded_names: ExclusionLedger::new(),
        }
    }
}
