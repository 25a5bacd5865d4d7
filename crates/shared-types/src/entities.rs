//! # Core Entities
//!
//! Identifiers and the partial option record shared by every producer.

use serde::{Deserialize, Serialize};

/// Unique option identifier. Larger ids are newer.
pub type OptionId = u64;

/// Opaque post identifier.
pub type PostId = String;

/// Opaque user identifier.
pub type UserId = String;

/// What an option represents on its post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionKind {
    /// A bid on an auction post. `support_metric` is the pledged total.
    Bid,
    /// A choice on a multiple-choice post. `support_metric` is the vote count.
    #[default]
    Choice,
}

/// A partial option record.
///
/// Every field except `id` may be absent. Absent fields never overwrite
/// known values when merged into the option store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionPatch {
    /// Option identifier.
    pub id: OptionId,
    /// User that created the option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<UserId>,
    /// Pledged amount (bids, minor units) or vote count (choices).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_metric: Option<u64>,
    /// Whether the viewing user backs this option (server computed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_supported_by_current_user: Option<bool>,
    /// Whether the creator is a subscriber of the post owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_created_by_subscriber: Option<bool>,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Number of distinct supporters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supporter_count: Option<u64>,
    /// Bid or choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<OptionKind>,
}

impl OptionPatch {
    /// Create an empty patch for `id`.
    pub fn new(id: OptionId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Set the creator.
    #[must_use]
    pub fn with_creator(mut self, creator_id: impl Into<UserId>) -> Self {
        self.creator_id = Some(creator_id.into());
        self
    }

    /// Set the support metric.
    #[must_use]
    pub fn with_support(mut self, support_metric: u64) -> Self {
        self.support_metric = Some(support_metric);
        self
    }

    /// Set the viewer-support flag.
    #[must_use]
    pub fn supported_by_viewer(mut self, supported: bool) -> Self {
        self.is_supported_by_current_user = Some(supported);
        self
    }

    /// Set the subscriber flag.
    #[must_use]
    pub fn by_subscriber(mut self, subscriber: bool) -> Self {
        self.is_created_by_subscriber = Some(subscriber);
        self
    }

    /// Set the display title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the option kind.
    #[must_use]
    pub fn with_kind(mut self, kind: OptionKind) -> Self {
        self.kind = Some(kind);
        self
    }
}
