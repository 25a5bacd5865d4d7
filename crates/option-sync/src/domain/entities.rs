//! # Domain Entities
//!
//! `VoteOption` (one bid or one choice), page cursors and typed deltas.

use serde::{Deserialize, Serialize};
pub use shared_types::{OptionId, OptionKind, OptionPatch, OptionsPageResponse, PostId, UserId};

/// One bid (auction) or one choice (multiple-choice) as held by the store.
///
/// `is_highest` is deliberately absent: leadership is a property of a
/// ranking pass, see `RankedEntry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOption {
    /// Option identifier. Larger is newer.
    pub id: OptionId,
    /// Creator, once known. Never replaced after it is set.
    pub creator_id: Option<UserId>,
    /// Pledged total (bids) or vote count (choices).
    pub support_metric: u64,
    /// Server-computed: the viewer backs this option.
    pub is_supported_by_current_user: bool,
    /// Creator is a subscriber of the post owner.
    pub is_created_by_subscriber: bool,
    /// Display title.
    pub title: Option<String>,
    /// Distinct supporters.
    pub supporter_count: u64,
    /// Bid or choice.
    pub kind: OptionKind,
}

impl VoteOption {
    /// Build a full record from a patch, defaulting absent fields.
    pub fn from_patch(patch: OptionPatch) -> Self {
        Self {
            id: patch.id,
            creator_id: patch.creator_id,
            support_metric: patch.support_metric.unwrap_or_default(),
            is_supported_by_current_user: patch.is_supported_by_current_user.unwrap_or_default(),
            is_created_by_subscriber: patch.is_created_by_subscriber.unwrap_or_default(),
            title: patch.title,
            supporter_count: patch.supporter_count.unwrap_or_default(),
            kind: patch.kind.unwrap_or_default(),
        }
    }

    /// Merge the fields present in `patch`.
    ///
    /// Returns `true` if anything changed. The creator is only filled in
    /// when still unknown; the id is never touched.
    pub fn merge(&mut self, patch: &OptionPatch) -> bool {
        let before = self.clone();

        if self.creator_id.is_none() {
            if let Some(creator) = &patch.creator_id {
                self.creator_id = Some(creator.clone());
            }
        }
        if let Some(metric) = patch.support_metric {
            self.support_metric = metric;
        }
        if let Some(supported) = patch.is_supported_by_current_user {
            self.is_supported_by_current_user = supported;
        }
        if let Some(subscriber) = patch.is_created_by_subscriber {
            self.is_created_by_subscriber = subscriber;
        }
        if let Some(title) = &patch.title {
            self.title = Some(title.clone());
        }
        if let Some(count) = patch.supporter_count {
            self.supporter_count = count;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }

        *self != before
    }

    /// Whether `user` created this option.
    pub fn is_created_by(&self, user: &str) -> bool {
        self.creator_id.as_deref() == Some(user)
    }
}

/// Position in the paginated option listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PageCursor {
    /// No page fetched yet.
    #[default]
    Start,
    /// Opaque token returned with the last page.
    Next(String),
    /// The server reported no further pages.
    Exhausted,
}

impl PageCursor {
    /// Interpret a server `nextCursor`: absent or empty means exhausted.
    pub fn from_next(next: Option<String>) -> Self {
        match next {
            Some(token) if !token.is_empty() => Self::Next(token),
            _ => Self::Exhausted,
        }
    }

    /// Token to send with the request (`None` for the first page).
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Next(token) => Some(token.as_str()),
            Self::Start | Self::Exhausted => None,
        }
    }

    /// No further pages.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

impl std::fmt::Display for PageCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "<start>"),
            Self::Next(token) => write!(f, "{}", token),
            Self::Exhausted => write!(f, "<exhausted>"),
        }
    }
}

/// One fetched page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionPage {
    /// Options on the page, in server order.
    pub options: Vec<OptionPatch>,
    /// Where the next request starts.
    pub next_cursor: PageCursor,
}

impl From<OptionsPageResponse> for OptionPage {
    fn from(response: OptionsPageResponse) -> Self {
        Self {
            options: response.options,
            next_cursor: PageCursor::from_next(response.next_cursor),
        }
    }
}

/// A typed incremental change pushed for a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
    /// An option was created or its support changed.
    OptionUpsert {
        /// Post the option belongs to.
        post_id: PostId,
        /// Changed fields.
        patch: OptionPatch,
    },
    /// An option was removed.
    OptionDeleted {
        /// Post the option belonged to.
        post_id: PostId,
        /// Removed option.
        option_id: OptionId,
    },
}

impl Delta {
    /// Post this delta targets.
    pub fn post_id(&self) -> &str {
        match self {
            Self::OptionUpsert { post_id, .. } | Self::OptionDeleted { post_id, .. } => {
                post_id.as_str()
            }
        }
    }

    /// Metric label for this delta kind.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::OptionUpsert { .. } => "upsert",
            Self::OptionDeleted { .. } => "deleted",
        }
    }
}
