//! Folding a batch of outcomes into a project's results store.

use serde::{Deserialize, Serialize};

use stitch_core::ResultsStore;

use crate::dispatch::PairwiseOutcome;

/// What a merge did to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSummary {
    /// Pairs whose fresh result now sits in the store.
    pub inserted: usize,
    /// Stale entries cleared because their pair was recomputed.
    pub removed: usize,
    /// Pairs that produced no result this run.
    pub failed: usize,
}

/// Replace every recomputed pair's entry with this run's outcome.
///
/// A recomputed pair always clears whatever the store previously held for
/// it, under either orientation; a failed pair therefore ends up absent
/// rather than silently keeping an out-of-date transform.
pub fn merge_outcomes(store: &mut ResultsStore, outcomes: Vec<PairwiseOutcome>) -> MergeSummary {
    let mut summary = MergeSummary::default();
    for outcome in outcomes {
        let key = outcome.pair.key();
        if store.remove(&key).is_some() {
            summary.removed += 1;
        }
        match outcome.result {
            Some(result) => {
                store.insert(result);
                summary.inserted += 1;
            }
            None => summary.failed += 1,
        }
    }
    summary
}
