//! # Value Objects
//!
//! Ranking output, sync state and the published view snapshot.

use super::entities::{OptionId, PageCursor, PostId, VoteOption};
use super::errors::SyncError;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Result of merging one patch into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The id was unseen.
    Inserted,
    /// At least one field changed.
    Updated,
    /// The patch carried nothing new.
    Unchanged,
    /// The id was deleted earlier in this view and the patch was ignored.
    Suppressed,
}

impl UpsertOutcome {
    /// Whether the store contents changed.
    pub fn changed(self) -> bool {
        matches!(self, Self::Inserted | Self::Updated)
    }
}

/// One ranked position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedEntry {
    /// Option at this position.
    pub id: OptionId,
    /// Set on exactly one entry of a non-empty ranking.
    pub is_highest: bool,
}

/// Display order produced by one ranking pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RankingSnapshot {
    /// Entries in display order.
    pub entries: Vec<RankedEntry>,
    /// Incremented by the reconciler on every pass.
    pub revision: u64,
}

impl RankingSnapshot {
    /// Empty ranking at revision 0.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set the revision.
    #[must_use]
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    /// Ids in display order.
    pub fn ids(&self) -> Vec<OptionId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    /// The highest option, if any.
    pub fn leader(&self) -> Option<OptionId> {
        self.entries.iter().find(|e| e.is_highest).map(|e| e.id)
    }

    /// Index of `id` in display order.
    pub fn position(&self, id: OptionId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Number of ranked entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is ranked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reconciler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// Nothing outstanding.
    #[default]
    Idle,
    /// A page request is outstanding.
    FetchingPage,
    /// A ranking pass is running.
    Reconciling,
}

/// Identifies one outstanding page request.
///
/// Results carrying a ticket that no longer matches (the view switched
/// post, or the request was superseded) are discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    /// Unique per request.
    pub id: Uuid,
    /// Post the request was issued for.
    pub post_id: PostId,
    /// Cursor the request was issued with.
    pub cursor: PageCursor,
}

impl FetchTicket {
    /// Issue a ticket.
    pub fn new(post_id: impl Into<PostId>, cursor: PageCursor) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id: post_id.into(),
            cursor,
        }
    }
}

/// Answer to a "load more" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadMoreOutcome {
    /// A request was issued.
    Started(FetchTicket),
    /// A request is already outstanding; nothing was queued.
    AlreadyLoading,
    /// The server reported no further pages.
    Exhausted,
}

/// Pagination progress as seen by renderers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PagingStatus {
    /// Current reconciler state.
    pub state: SyncState,
    /// No further pages.
    pub exhausted: bool,
    /// Last page failure, cleared by the next success.
    pub last_error: Option<SyncError>,
    /// The feed lost deltas and the store is being rebuilt from page one.
    /// Cleared once the first page of the rebuild is merged.
    pub stale: bool,
    /// Rebuilds triggered by feed gaps since this post was mounted.
    pub resyncs: u64,
}

/// Snapshot published after every applied batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    /// Post being viewed.
    pub post_id: PostId,
    /// Display order.
    pub ranking: RankingSnapshot,
    /// Id lookup for renderers.
    pub options: BTreeMap<OptionId, VoteOption>,
    /// Pagination progress.
    pub paging: PagingStatus,
    /// Feed frames received for this post, applied or dropped.
    pub frames_received: u64,
}

impl ViewState {
    /// Initial state for `post_id`.
    pub fn new(post_id: impl Into<PostId>) -> Self {
        Self {
            post_id: post_id.into(),
            ..Default::default()
        }
    }

    /// Options in display order, with their leader flag.
    pub fn ranked_options(&self) -> impl Iterator<Item = (&VoteOption, bool)> + '_ {
        self.ranking
            .entries
            .iter()
            .filter_map(|e| self.options.get(&e.id).map(|o| (o, e.is_highest)))
    }

    /// The highest option, if any.
    pub fn leader(&self) -> Option<&VoteOption> {
        self.ranking.leader().and_then(|id| self.options.get(&id))
    }
}
