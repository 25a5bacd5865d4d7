//! # Reconciler
//!
//! Folds pages, pushed deltas and optimistic edits into one option store
//! and recomputes the ranking after every applied batch.
//!
//! ## State Machine
//!
//! ```text
//! Idle ──begin_load_more──→ FetchingPage ──complete_load_more──→ Idle
//!   │                            │
//!   └──── any change ──→ Reconciling ──→ (previous state)
//! ```
//!
//! Deltas are never blocked by an outstanding fetch. Synchronous and
//! single-owner: the `PostView` actor is the only caller.
//!
//! A delete that lands while a page is outstanding tombstones the id until
//! that page completes, so the page cannot restore it. Outside a fetch,
//! deletes and upserts simply apply in arrival order.

use crate::algorithms::rank;
use crate::domain::{
    Delta, FetchTicket, LoadMoreOutcome, OptionId, OptionPage, OptionPatch, OptionStore,
    PageCursor, PagingStatus, PostId, RankingSnapshot, SyncError, SyncState, UpsertOutcome,
    UserId, ViewState, VoteOption,
};
use sync_telemetry::metrics::{
    DELTAS_APPLIED, DELTAS_DROPPED, FEED_RESYNCS, OPTIMISTIC_MUTATIONS, OPTION_STORE_SIZE,
    RANKING_PASSES,
};
use tracing::{debug, info, warn};

/// Sync core for one post.
#[derive(Debug)]
pub struct Reconciler {
    post_id: PostId,
    current_user: Option<UserId>,
    store: OptionStore,
    cursor: PageCursor,
    state: SyncState,
    snapshot: RankingSnapshot,
    last_error: Option<SyncError>,
    pending: Option<FetchTicket>,
    revision: u64,
    frames_received: u64,
    stale: bool,
    resyncs: u64,
    /// Store size last added to `OPTION_STORE_SIZE`.
    reported_size: i64,
}

impl Reconciler {
    /// Create an empty reconciler for `post_id`.
    pub fn new(post_id: impl Into<PostId>, current_user: Option<UserId>) -> Self {
        Self {
            post_id: post_id.into(),
            current_user,
            store: OptionStore::new(),
            cursor: PageCursor::Start,
            state: SyncState::Idle,
            snapshot: RankingSnapshot::empty(),
            last_error: None,
            pending: None,
            revision: 0,
            frames_received: 0,
            stale: false,
            resyncs: 0,
            reported_size: 0,
        }
    }

    /// Post being reconciled.
    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    /// Viewing user, if signed in.
    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref()
    }

    /// Current store.
    pub fn store(&self) -> &OptionStore {
        &self.store
    }

    /// Cursor the next page request will use.
    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    /// Current state.
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Latest ranking.
    pub fn snapshot(&self) -> &RankingSnapshot {
        &self.snapshot
    }

    /// Last page failure, cleared by the next successful page.
    pub fn last_error(&self) -> Option<&SyncError> {
        self.last_error.as_ref()
    }

    /// Outstanding page request, if any.
    pub fn pending(&self) -> Option<&FetchTicket> {
        self.pending.as_ref()
    }

    /// Whether `ticket` is the outstanding page request.
    pub fn is_pending(&self, ticket: &FetchTicket) -> bool {
        self.pending.as_ref() == Some(ticket)
    }

    /// Whether the store is being rebuilt after a feed gap.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Start a page request if none is outstanding and pages remain.
    pub fn begin_load_more(&mut self) -> LoadMoreOutcome {
        if self.cursor.is_exhausted() {
            return LoadMoreOutcome::Exhausted;
        }
        if self.pending.is_some() {
            return LoadMoreOutcome::AlreadyLoading;
        }

        let ticket = FetchTicket::new(self.post_id.clone(), self.cursor.clone());
        debug!(post_id = %self.post_id, cursor = %self.cursor, ticket = %ticket.id, "[option-sync] Load more");
        self.pending = Some(ticket.clone());
        self.state = SyncState::FetchingPage;
        LoadMoreOutcome::Started(ticket)
    }

    /// Finish the request identified by `ticket`.
    ///
    /// A successful page is merged as one batch, the cursor advances and the
    /// ranking is recomputed once. A failure leaves the store and cursor
    /// untouched so the retry reuses the same cursor. Results for a ticket
    /// that is no longer outstanding are ignored.
    ///
    /// Returns the number of options that changed.
    pub fn complete_load_more(
        &mut self,
        ticket: &FetchTicket,
        result: Result<OptionPage, SyncError>,
    ) -> Result<usize, SyncError> {
        if !self.is_pending(ticket) {
            debug!(post_id = %self.post_id, ticket = %ticket.id, "[option-sync] Ignoring stale page result");
            return Ok(0);
        }
        self.pending = None;
        self.state = SyncState::Idle;

        let result = match result {
            Ok(page) => {
                let received = page.options.len();
                let changed = page
                    .options
                    .into_iter()
                    .map(|patch| self.store.upsert_unless_deleted(patch))
                    .filter(|outcome| outcome.changed())
                    .count();
                self.cursor = page.next_cursor;
                self.last_error = None;
                self.stale = false;
                self.reconcile();
                info!(
                    post_id = %self.post_id,
                    received,
                    changed,
                    next = %self.cursor,
                    "[option-sync] Page merged"
                );
                Ok(changed)
            }
            Err(e) => {
                warn!(post_id = %self.post_id, error = %e, "[option-sync] Page failed, store unchanged");
                self.last_error = Some(e.clone());
                Err(e)
            }
        };
        self.store.clear_tombstones();
        result
    }

    /// Apply a pushed delta.
    ///
    /// Returns whether the store changed. Deleting an id the store never
    /// held is a no-op.
    ///
    /// # Errors
    ///
    /// `PostMismatch` if the delta targets another post. Nothing is applied.
    pub fn apply_delta(&mut self, delta: Delta) -> Result<bool, SyncError> {
        if delta.post_id() != self.post_id {
            DELTAS_DROPPED.with_label_values(&["foreign_post"]).inc();
            return Err(SyncError::PostMismatch {
                expected: self.post_id.clone(),
                got: delta.post_id().to_string(),
            });
        }

        let label = delta.kind_label();
        let changed = match delta {
            Delta::OptionUpsert { patch, .. } => {
                let id = patch.id;
                let outcome = self.store.upsert(patch);
                debug!(post_id = %self.post_id, option = id, outcome = ?outcome, "[option-sync] Upsert delta");
                outcome.changed()
            }
            Delta::OptionDeleted { option_id, .. } => match self.remove(option_id) {
                Some(_) => {
                    debug!(post_id = %self.post_id, option = option_id, "[option-sync] Option deleted");
                    true
                }
                None => {
                    debug!(
                        post_id = %self.post_id,
                        "[option-sync] {}, delete ignored",
                        SyncError::NotFound(option_id)
                    );
                    false
                }
            },
        };
        DELTAS_APPLIED.with_label_values(&[label]).inc();

        if changed {
            self.reconcile();
        }
        Ok(changed)
    }

    fn remove(&mut self, option_id: OptionId) -> Option<VoteOption> {
        if self.pending.is_some() {
            self.store.remove_during_fetch(option_id)
        } else {
            self.store.remove(option_id)
        }
    }

    /// Apply a local edit ahead of server confirmation.
    ///
    /// Later pages and deltas overwrite it. Edits to an option deleted while
    /// a page is outstanding are ignored.
    pub fn apply_optimistic(&mut self, patch: OptionPatch) -> bool {
        let id = patch.id;
        let outcome = self.store.upsert_unless_deleted(patch);
        OPTIMISTIC_MUTATIONS.inc();
        debug!(post_id = %self.post_id, option = id, outcome = ?outcome, "[option-sync] Optimistic edit");

        if outcome == UpsertOutcome::Suppressed {
            return false;
        }
        if outcome.changed() {
            self.reconcile();
        }
        outcome.changed()
    }

    /// Count a feed frame received for this post.
    pub fn record_frame(&mut self) {
        self.frames_received += 1;
    }

    /// Discard everything and start paging again from the first page.
    ///
    /// Called when the feed lost `missed` frames: any of them may have been
    /// a delta, so the store can no longer be trusted. Deltas keep applying
    /// on top of the empty store while the caller refetches. An outstanding
    /// page request is forgotten and its result will be ignored.
    pub fn resync(&mut self, missed: u64) {
        warn!(
            post_id = %self.post_id,
            missed,
            held = self.store.len(),
            "[option-sync] Feed gap, rebuilding from first page"
        );
        self.store.clear();
        self.cursor = PageCursor::Start;
        self.pending = None;
        self.state = SyncState::Idle;
        self.last_error = None;
        self.stale = true;
        self.resyncs += 1;
        FEED_RESYNCS.inc();
        self.reconcile();
    }

    /// Recompute the ranking from the current store.
    pub fn reconcile(&mut self) {
        let previous = self.state;
        self.state = SyncState::Reconciling;

        let options = self.store.snapshot();
        self.revision += 1;
        self.snapshot = rank(&options, self.current_user.as_deref()).with_revision(self.revision);

        RANKING_PASSES.inc();
        let size = options.len() as i64;
        OPTION_STORE_SIZE.add(size - self.reported_size);
        self.reported_size = size;
        self.state = previous;
    }

    /// Snapshot for renderers.
    pub fn view_state(&self) -> ViewState {
        ViewState {
            post_id: self.post_id.clone(),
            ranking: self.snapshot.clone(),
            options: self.store.to_map(),
            paging: PagingStatus {
                state: self.state,
                exhausted: self.cursor.is_exhausted(),
                last_error: self.last_error.clone(),
                stale: self.stale,
                resyncs: self.resyncs,
            },
            frames_received: self.frames_received,
        }
    }
}

impl Drop for Reconciler {
    fn drop(&mut self) {
        OPTION_STORE_SIZE.sub(self.reported_size);
    }
}
