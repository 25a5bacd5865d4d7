//! # Inbound Ports
//!
//! API trait defining what a mounted post view offers its renderer.

use crate::domain::{
    LoadMoreOutcome, OptionId, OptionPatch, PostId, RankingSnapshot, SyncError, ViewState,
    VoteOption,
};
use async_trait::async_trait;

/// Post view API - inbound port.
#[async_trait]
pub trait PostViewApi: Send + Sync {
    /// Request the next page. Never queues a second fetch.
    async fn load_more(&self) -> Result<LoadMoreOutcome, SyncError>;

    /// Apply a local edit ahead of server confirmation.
    ///
    /// Returns whether the store changed.
    async fn apply_optimistic(&self, patch: OptionPatch) -> Result<bool, SyncError>;

    /// Drop the current post's store and subscription and start over on
    /// `post_id`.
    async fn switch_post(&self, post_id: PostId) -> Result<(), SyncError>;

    /// Latest published state.
    fn state(&self) -> ViewState;

    /// Latest published display order.
    fn snapshot(&self) -> RankingSnapshot;

    /// Look up one option by id.
    fn option(&self, id: OptionId) -> Option<VoteOption>;
}
