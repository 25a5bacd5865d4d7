//! # Domain Invariants
//!
//! Checks over a ranking pass and the options it was computed from.

use super::entities::VoteOption;
use super::value_objects::RankingSnapshot;
use std::collections::HashSet;

/// Invariant: single leader.
///
/// A non-empty ranking marks exactly one entry highest, and that entry
/// carries the maximal support metric. An empty ranking has no leader.
pub fn invariant_single_leader(ranking: &RankingSnapshot, options: &[VoteOption]) -> bool {
    let leaders: Vec<_> = ranking.entries.iter().filter(|e| e.is_highest).collect();

    if options.is_empty() {
        return leaders.is_empty();
    }
    if leaders.len() != 1 {
        return false;
    }

    let max = options.iter().map(|o| o.support_metric).max();
    options
        .iter()
        .find(|o| o.id == leaders[0].id)
        .map(|o| Some(o.support_metric) == max)
        .unwrap_or(false)
}

/// Invariant: total coverage.
///
/// Every option id appears in the ranking exactly once, and nothing else
/// does.
pub fn invariant_total_coverage(ranking: &RankingSnapshot, options: &[VoteOption]) -> bool {
    if ranking.len() != options.len() {
        return false;
    }
    let mut seen = HashSet::with_capacity(ranking.len());
    let expected: HashSet<_> = options.iter().map(|o| o.id).collect();
    ranking
        .entries
        .iter()
        .all(|e| seen.insert(e.id) && expected.contains(&e.id))
}
