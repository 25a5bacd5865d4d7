//! Delta Feed Listener
//!
//! Turns raw bus frames into typed deltas for one post.
//! Frames for other posts and frames that fail to decode are dropped here
//! and never reach the reconciler.

use crate::domain::{Delta, PostId, SyncError};
use shared_bus::{
    EventFilter, EventSubscriber, FeedFrame, FeedTopic, Subscription, SubscriptionError,
};
use shared_types::{
    OptionDeletedPayload, OptionUpsertPayload, OPTION_DELETED_EVENT, OPTION_UPSERT_EVENT,
};
use sync_telemetry::metrics::DELTAS_DROPPED;
use tracing::{debug, warn};

/// Why a frame did not become a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Payload did not match the event's schema.
    Decode,
    /// Delta addressed another post.
    ForeignPost,
    /// Event name is not an option event.
    UnknownEvent,
}

impl DropReason {
    /// Metric label.
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Decode => "decode",
            Self::ForeignPost => "foreign_post",
            Self::UnknownEvent => "unknown_event",
        }
    }
}

/// One item read from the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedItem {
    /// A delta for the viewed post.
    Delta(Delta),
    /// A frame that was received and discarded.
    Dropped(DropReason),
    /// The listener fell behind and this many frames were lost. Deltas
    /// may be missing, so the view must resync from the server.
    Lagged(u64),
}

/// Decode a bus frame into a delta.
///
/// Returns `Ok(None)` for events that are not option events.
pub fn decode_frame(frame: &FeedFrame) -> Result<Option<Delta>, SyncError> {
    match frame.event.as_str() {
        OPTION_UPSERT_EVENT => {
            let payload: OptionUpsertPayload = serde_json::from_value(frame.payload.clone())
                .map_err(|e| SyncError::DecodeFailed(format!("{}: {}", frame.event, e)))?;
            Ok(Some(Delta::OptionUpsert {
                post_id: payload.post_id,
                patch: payload.option,
            }))
        }
        OPTION_DELETED_EVENT => {
            let payload: OptionDeletedPayload = serde_json::from_value(frame.payload.clone())
                .map_err(|e| SyncError::DecodeFailed(format!("{}: {}", frame.event, e)))?;
            Ok(Some(Delta::OptionDeleted {
                post_id: payload.post_id,
                option_id: payload.option_id,
            }))
        }
        _ => Ok(None),
    }
}

/// Push feed subscription scoped to one post.
///
/// Dropping the listener releases the bus subscription.
pub struct DeltaFeedListener {
    post_id: PostId,
    subscription: Subscription,
}

impl DeltaFeedListener {
    /// Subscribe to option frames for `post_id`.
    pub fn subscribe(feed: &dyn EventSubscriber, post_id: impl Into<PostId>) -> Self {
        let post_id = post_id.into();
        let subscription = feed.subscribe(EventFilter::topics(vec![FeedTopic::Options]));
        debug!(post_id = %post_id, subscription = %subscription.id(), "[option-sync] Feed listener subscribed");
        Self {
            post_id,
            subscription,
        }
    }

    /// Post this listener is scoped to.
    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    /// Frames lost because this listener fell behind the bus.
    pub fn lagged(&self) -> u64 {
        self.subscription.lagged()
    }

    /// Wait for the next frame.
    ///
    /// Returns `None` once the bus is closed.
    pub async fn next(&mut self) -> Option<FeedItem> {
        match self.subscription.recv().await {
            Ok(frame) => Some(self.classify(&frame)),
            Err(SubscriptionError::Lagged(missed)) => {
                warn!(post_id = %self.post_id, missed, "[option-sync] Feed listener lagged, deltas lost");
                DELTAS_DROPPED.with_label_values(&["lagged"]).inc_by(missed as f64);
                Some(FeedItem::Lagged(missed))
            }
            Err(SubscriptionError::Closed) => None,
        }
    }

    fn classify(&self, frame: &FeedFrame) -> FeedItem {
        let reason = match decode_frame(frame) {
            Ok(Some(delta)) if delta.post_id() == self.post_id => return FeedItem::Delta(delta),
            Ok(Some(delta)) => {
                debug!(
                    post_id = %self.post_id,
                    foreign = delta.post_id(),
                    "[option-sync] Ignoring delta for another post"
                );
                DropReason::ForeignPost
            }
            Ok(None) => {
                debug!(event = %frame.event, "[option-sync] Ignoring unknown event");
                DropReason::UnknownEvent
            }
            Err(e) => {
                warn!(post_id = %self.post_id, error = %e, "[option-sync] Dropping malformed frame");
                DropReason::Decode
            }
        };
        DELTAS_DROPPED.with_label_values(&[reason.as_label()]).inc();
        FeedItem::Dropped(reason)
    }

    /// Release the subscription.
    pub fn unsubscribe(self) {
        debug!(post_id = %self.post_id, "[option-sync] Feed listener unsubscribed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::{EventPublisher, InMemoryEventBus};
    use shared_types::OptionPatch;
    use std::time::Duration;

    #[test]
    fn test_decode_upsert() {
        let frame = FeedFrame::upsert("p1", OptionPatch::new(5).with_support(10));
        let delta = decode_frame(&frame).unwrap().unwrap();
        assert_eq!(
            delta,
            Delta::OptionUpsert {
                post_id: "p1".to_string(),
                patch: OptionPatch::new(5).with_support(10),
            }
        );
    }

    #[test]
    fn test_decode_deleted() {
        let frame = FeedFrame::deleted("p1", 42);
        assert_eq!(
            decode_frame(&frame).unwrap(),
            Some(Delta::OptionDeleted {
                post_id: "p1".to_string(),
                option_id: 42,
            })
        );
    }

    #[test]
    fn test_decode_malformed() {
        let frame = FeedFrame::new(OPTION_DELETED_EVENT, serde_json::json!({"postId": 3}));
        assert!(matches!(decode_frame(&frame), Err(SyncError::DecodeFailed(_))));
    }

    #[test]
    fn test_decode_unknown_event() {
        let frame = FeedFrame::new("chat_message", serde_json::json!({"text": "hi"}));
        assert_eq!(decode_frame(&frame).unwrap(), None);
    }

    #[tokio::test]
    async fn test_listener_filters_foreign_post() {
        let bus = InMemoryEventBus::new();
        let mut listener = DeltaFeedListener::subscribe(&bus, "p1");

        bus.publish(FeedFrame::deleted("p2", 1)).await;
        bus.publish(FeedFrame::deleted("p1", 2)).await;

        let first = tokio::time::timeout(Duration::from_secs(1), listener.next())
            .await
            .unwrap();
        assert_eq!(first, Some(FeedItem::Dropped(DropReason::ForeignPost)));

        let second = tokio::time::timeout(Duration::from_secs(1), listener.next())
            .await
            .unwrap();
        assert_eq!(
            second,
            Some(FeedItem::Delta(Delta::OptionDeleted {
                post_id: "p1".to_string(),
                option_id: 2,
            }))
        );
    }

    #[tokio::test]
    async fn test_listener_survives_malformed_frame() {
        let bus = InMemoryEventBus::new();
        let mut listener = DeltaFeedListener::subscribe(&bus, "p1");

        bus.publish(FeedFrame::new(OPTION_UPSERT_EVENT, serde_json::json!("garbage")))
            .await;
        bus.publish(FeedFrame::upsert("p1", OptionPatch::new(1))).await;

        assert_eq!(
            listener.next().await,
            Some(FeedItem::Dropped(DropReason::Decode))
        );
        assert!(matches!(listener.next().await, Some(FeedItem::Delta(_))));
    }

    #[tokio::test]
    async fn test_listener_reports_lag() {
        let bus = InMemoryEventBus::with_capacity(2);
        let mut listener = DeltaFeedListener::subscribe(&bus, "p1");

        for id in 1..=5 {
            bus.publish(FeedFrame::upsert("p1", OptionPatch::new(id))).await;
        }

        assert_eq!(listener.next().await, Some(FeedItem::Lagged(3)));
        assert_eq!(listener.lagged(), 3);
        assert!(matches!(
            listener.next().await,
            Some(FeedItem::Delta(Delta::OptionUpsert { patch, .. })) if patch.id == 4
        ));
    }

    #[test]
    fn test_unsubscribe_releases_subscription() {
        let bus = InMemoryEventBus::new();
        let listener = DeltaFeedListener::subscribe(&bus, "p1");
        assert_eq!(bus.subscriber_count(), 1);

        listener.unsubscribe();
        assert_eq!(bus.subscriber_count(), 0);
    }
}
