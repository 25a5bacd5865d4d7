//! # Feed Frames
//!
//! The unit of delivery on the bus: an event name plus an undecoded JSON
//! payload.

use serde::{Deserialize, Serialize};
use shared_types::{
    OptionDeletedPayload, OptionId, OptionPatch, OptionUpsertPayload, PostId,
    OPTION_DELETED_EVENT, OPTION_UPSERT_EVENT,
};

/// A raw frame as delivered by the push transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedFrame {
    /// Event name (e.g. `option_upsert`).
    pub event: String,
    /// Undecoded payload.
    pub payload: serde_json::Value,
}

impl FeedFrame {
    /// Create a frame from raw parts.
    pub fn new(event: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }

    /// Encode an `option_upsert` frame.
    pub fn upsert(post_id: impl Into<PostId>, option: OptionPatch) -> Self {
        let payload = OptionUpsertPayload {
            post_id: post_id.into(),
            option,
        };
        Self::new(
            OPTION_UPSERT_EVENT,
            serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        )
    }

    /// Encode an `option_deleted` frame.
    pub fn deleted(post_id: impl Into<PostId>, option_id: OptionId) -> Self {
        let payload = OptionDeletedPayload {
            post_id: post_id.into(),
            option_id,
        };
        Self::new(
            OPTION_DELETED_EVENT,
            serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        )
    }

    /// Get the topic for this frame (for filtering).
    #[must_use]
    pub fn topic(&self) -> FeedTopic {
        match self.event.as_str() {
            OPTION_UPSERT_EVENT | OPTION_DELETED_EVENT => FeedTopic::Options,
            _ => FeedTopic::Other,
        }
    }
}

/// Frame topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedTopic {
    /// Option created, updated or deleted.
    Options,
    /// Anything else the transport carries (chat, notifications, ...).
    Other,
    /// All frames (no filtering).
    All,
}

/// Filter for subscribing to specific frames.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<FeedTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all frames.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<FeedTopic>) -> Self {
        Self { topics }
    }

    /// Check if a frame matches this filter.
    #[must_use]
    pub fn matches(&self, frame: &FeedFrame) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&FeedTopic::All)
            || self.topics.contains(&frame.topic())
    }
}
