//! # Option Store
//!
//! The deduplicated working set of options for one post view.
//!
//! ## Data Structures
//!
//! - `options`: `BTreeMap` keyed by id. Iteration is ascending by id, which
//!   keeps `all()` deterministic for the ranking pass.
//! - `tombstones`: ids that were held and then deleted while a page request
//!   was outstanding. That page may predate the delete, so it must not bring
//!   them back. The owner clears the set when the request completes.
//!
//! No I/O. Owned by exactly one reconciler.

use super::entities::{OptionId, OptionPatch, VoteOption};
use super::value_objects::UpsertOutcome;
use std::collections::{BTreeMap, BTreeSet};

/// Deduplicated options of one post, keyed by id.
#[derive(Debug, Default, Clone)]
pub struct OptionStore {
    /// Current options.
    options: BTreeMap<OptionId, VoteOption>,
    /// Ids deleted while a page request was outstanding.
    tombstones: BTreeSet<OptionId>,
}

impl OptionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of options held.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// True if no options are held.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Gets an option by id.
    pub fn get(&self, id: OptionId) -> Option<&VoteOption> {
        self.options.get(&id)
    }

    /// Checks if an option is held.
    pub fn contains(&self, id: OptionId) -> bool {
        self.options.contains_key(&id)
    }

    /// Whether `id` was deleted during the outstanding page request.
    pub fn is_tombstoned(&self, id: OptionId) -> bool {
        self.tombstones.contains(&id)
    }

    /// Number of tombstones held.
    pub fn tombstone_count(&self) -> usize {
        self.tombstones.len()
    }

    /// Inserts an unseen option or merges the patch into the existing one.
    ///
    /// This is the server-push path: it also lifts a tombstone, since the
    /// server announcing the option again outranks an earlier delete.
    pub fn upsert(&mut self, patch: OptionPatch) -> UpsertOutcome {
        self.tombstones.remove(&patch.id);
        self.merge_patch(patch)
    }

    /// Like `upsert`, but ignores patches for tombstoned ids.
    ///
    /// Used for page results and optimistic edits, which may have been
    /// produced before a delete that arrived during the request.
    pub fn upsert_unless_deleted(&mut self, patch: OptionPatch) -> UpsertOutcome {
        if self.tombstones.contains(&patch.id) {
            return UpsertOutcome::Suppressed;
        }
        self.merge_patch(patch)
    }

    fn merge_patch(&mut self, patch: OptionPatch) -> UpsertOutcome {
        match self.options.get_mut(&patch.id) {
            Some(existing) => {
                if existing.merge(&patch) {
                    UpsertOutcome::Updated
                } else {
                    UpsertOutcome::Unchanged
                }
            }
            None => {
                self.options.insert(patch.id, VoteOption::from_patch(patch));
                UpsertOutcome::Inserted
            }
        }
    }

    /// Removes an option.
    ///
    /// Returns the removed option, or `None` if it was never held. Removing
    /// an absent id leaves the store untouched.
    pub fn remove(&mut self, id: OptionId) -> Option<VoteOption> {
        self.options.remove(&id)
    }

    /// Removes an option while a page request is outstanding.
    ///
    /// A held option is also tombstoned until `clear_tombstones`. An absent
    /// id is still a no-op.
    pub fn remove_during_fetch(&mut self, id: OptionId) -> Option<VoteOption> {
        let removed = self.options.remove(&id)?;
        self.tombstones.insert(id);
        Some(removed)
    }

    /// Forgets all tombstones. Called when the page request completes.
    pub fn clear_tombstones(&mut self) {
        self.tombstones.clear();
    }

    /// Iterates the current options in ascending id order.
    ///
    /// Each call starts a fresh pass over the current contents.
    pub fn all(&self) -> impl Iterator<Item = &VoteOption> + '_ {
        self.options.values()
    }

    /// Owned copy of the current options in ascending id order.
    pub fn snapshot(&self) -> Vec<VoteOption> {
        self.options.values().cloned().collect()
    }

    /// Owned id → option lookup for renderers.
    pub fn to_map(&self) -> BTreeMap<OptionId, VoteOption> {
        self.options.clone()
    }

    /// Discards all options and tombstones.
    pub fn clear(&mut self) {
        self.options.clear();
        self.tombstones.clear();
    }
}
