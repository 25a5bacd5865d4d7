//! # Domain Errors
//!
//! Error types for option synchronization.

use super::entities::{OptionId, PageCursor, PostId};
use thiserror::Error;

/// Option sync error types.
///
/// Only the fetch conditions reach callers; everything else is absorbed by
/// the view and logged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A page fetch for this post is already outstanding.
    #[error("Page fetch already in progress for post {post_id}")]
    FetchInProgress {
        /// Post with the outstanding fetch
        post_id: PostId,
    },

    /// A page fetch failed. Retrying with `cursor` is safe.
    #[error("Page fetch failed at cursor {cursor}: {reason}")]
    FetchFailed {
        /// Cursor of the failed request
        cursor: PageCursor,
        /// Transport or timeout description
        reason: String,
    },

    /// The listing has no further pages.
    #[error("No further pages")]
    PagesExhausted,

    /// A pushed frame could not be decoded.
    #[error("Delta decode failed: {0}")]
    DecodeFailed(String),

    /// Delete for an option the store never held.
    #[error("Option not found: {0}")]
    NotFound(OptionId),

    /// A mutation addressed a different post than the one viewed.
    #[error("Post mismatch: viewing {expected}, got {got}")]
    PostMismatch {
        /// Post currently viewed
        expected: PostId,
        /// Post the mutation addressed
        got: PostId,
    },

    /// The view actor has shut down.
    #[error("Post view closed")]
    ViewClosed,
}

impl SyncError {
    /// Whether the caller may retry the same operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchFailed { .. } | Self::FetchInProgress { .. })
    }
}
