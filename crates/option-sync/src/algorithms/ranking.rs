//! Ranking Engine
//!
//! Orders a post's options for display and marks the single highest one.
//! Pure: the same input always yields the same snapshot.

use crate::domain::entities::{OptionId, VoteOption};
use crate::domain::value_objects::{RankedEntry, RankingSnapshot};
use std::collections::HashSet;

/// Find the option with the maximal support metric.
///
/// Ties keep the first option encountered in input order.
pub fn find_leader(options: &[VoteOption]) -> Option<&VoteOption> {
    let mut leader: Option<&VoteOption> = None;
    for option in options {
        match leader {
            Some(current) if option.support_metric <= current.support_metric => {}
            _ => leader = Some(option),
        }
    }
    leader
}

/// Compute the display order of `options` for `current_user`.
///
/// Groups, concatenated in this order:
/// 1. the leader, if the viewer created or supports it
/// 2. options the viewer created
/// 3. options the viewer supports but did not create
/// 4. options created by subscribers
/// 5. the leader
/// 6. everything else
///
/// Groups 2 to 6 are newest first (id descending). An option keeps only its
/// first position. With no viewer, groups 1 to 3 are empty.
///
/// The returned snapshot has revision 0; the reconciler stamps it.
pub fn rank(options: &[VoteOption], current_user: Option<&str>) -> RankingSnapshot {
    let Some(leader) = find_leader(options) else {
        return RankingSnapshot::empty();
    };
    let leader_id = leader.id;

    let mut newest_first: Vec<&VoteOption> = options.iter().collect();
    newest_first.sort_by(|a, b| b.id.cmp(&a.id));

    let created_by_viewer =
        |o: &&VoteOption| current_user.map(|u| o.is_created_by(u)).unwrap_or(false);
    let supported_by_viewer =
        |o: &&VoteOption| current_user.is_some() && o.is_supported_by_current_user;

    let mut order: Vec<OptionId> = Vec::with_capacity(options.len() * 2);

    // a. viewer's stake in the lead
    if created_by_viewer(&leader) || supported_by_viewer(&leader) {
        order.push(leader_id);
    }
    // b. created by viewer
    order.extend(
        newest_first
            .iter()
            .copied()
            .filter(created_by_viewer)
            .map(|o| o.id),
    );
    // c. supported by viewer, created by someone else
    order.extend(
        newest_first
            .iter()
            .copied()
            .filter(|o| supported_by_viewer(o) && !created_by_viewer(o))
            .map(|o| o.id),
    );
    // d. subscribers
    order.extend(
        newest_first
            .iter()
            .filter(|o| o.is_created_by_subscriber)
            .map(|o| o.id),
    );
    // e. leader
    order.push(leader_id);
    // f. rest
    order.extend(newest_first.iter().map(|o| o.id));

    let mut seen = HashSet::with_capacity(options.len());
    let entries = order
        .into_iter()
        .filter(|id| seen.insert(*id))
        .map(|id| RankedEntry {
            id,
            is_highest: id == leader_id,
        })
        .collect();

    RankingSnapshot {
        entries,
        revision: 0,
    }
}
