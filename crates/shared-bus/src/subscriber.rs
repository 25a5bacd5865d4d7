//! # Frame Subscriber
//!
//! Defines the subscription side of the feed bus.

use crate::events::{EventFilter, FeedFrame};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was closed.
    #[error("Feed bus closed")]
    Closed,

    /// The subscriber fell behind and this many frames were overwritten.
    #[error("Subscriber lagged, {0} frames lost")]
    Lagged(u64),
}

/// Trait for subscribing to frames from the bus.
///
/// Post views receive an implementation at construction instead of reaching
/// for a global socket.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe to frames matching a filter.
    fn subscribe(&self, filter: EventFilter) -> Subscription;
}

/// A subscription handle for receiving frames.
///
/// Dropping the handle unsubscribes. Frames already buffered for this
/// handle are discarded with it.
pub struct Subscription {
    /// Subscription identifier.
    id: Uuid,

    /// The broadcast receiver.
    receiver: broadcast::Receiver<FeedFrame>,

    /// Filter for this subscription.
    filter: EventFilter,

    /// Reference to subscription tracking (for cleanup).
    subscriptions: Arc<RwLock<HashMap<Uuid, String>>>,

    /// Frames skipped because this subscriber lagged.
    lagged: u64,
}

impl Subscription {
    /// Create a new subscription.
    pub(crate) fn new(
        id: Uuid,
        receiver: broadcast::Receiver<FeedFrame>,
        filter: EventFilter,
        subscriptions: Arc<RwLock<HashMap<Uuid, String>>>,
    ) -> Self {
        Self {
            id,
            receiver,
            filter,
            subscriptions,
            lagged: 0,
        }
    }

    /// Receive the next frame that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Ok(frame)` - The next matching frame
    /// - `Err(SubscriptionError::Lagged(n))` - `n` frames were lost since the
    ///   last call; the following call resumes at the oldest retained frame
    /// - `Err(SubscriptionError::Closed)` - The channel was closed (bus dropped)
    pub async fn recv(&mut self) -> Result<FeedFrame, SubscriptionError> {
        loop {
            let frame = match self.receiver.recv().await {
                Ok(f) => f,
                Err(broadcast::error::RecvError::Closed) => return Err(SubscriptionError::Closed),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    self.lagged += count;
                    warn!(subscription = %self.id, lagged = count, "Subscriber lagged, frames dropped");
                    return Err(SubscriptionError::Lagged(count));
                }
            };

            if self.filter.matches(&frame) {
                return Ok(frame);
            }
        }
    }

    /// Try to receive the next frame without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(frame))` - A frame was available and matched
    /// - `Ok(None)` - No frame available (would block)
    /// - `Err(SubscriptionError::Lagged(n))` - `n` frames were lost
    /// - `Err(SubscriptionError::Closed)` - The channel was closed
    pub fn try_recv(&mut self) -> Result<Option<FeedFrame>, SubscriptionError> {
        loop {
            let frame = match self.receiver.try_recv() {
                Ok(f) => f,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    self.lagged += count;
                    return Err(SubscriptionError::Lagged(count));
                }
            };

            if self.filter.matches(&frame) {
                return Ok(Some(frame));
            }
        }
    }

    /// Get the subscription id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Total frames skipped because this subscriber fell behind.
    #[must_use]
    pub fn lagged(&self) -> u64 {
        self.lagged
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Ok(mut subs) = self.subscriptions.write() else {
            return;
        };
        subs.remove(&self.id);
        debug!(subscription = %self.id, "Subscription dropped");
    }
}
