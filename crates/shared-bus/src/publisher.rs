//! # Frame Publisher
//!
//! Defines the publishing side of the feed bus.

use crate::events::{EventFilter, FeedFrame};
use crate::subscriber::{EventSubscriber, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::collections::HashMap;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

/// Trait for publishing frames to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a frame to the bus.
    ///
    /// # Returns
    ///
    /// The number of active subscribers that received the frame.
    async fn publish(&self, frame: FeedFrame) -> usize;

    /// Get the total number of frames published.
    fn frames_published(&self) -> u64;
}

/// In-memory implementation of the feed bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer semantics.
/// A subscriber that falls behind by more than `capacity` frames loses the
/// oldest ones and is told how many were skipped.
pub struct InMemoryEventBus {
    /// Broadcast sender for frames.
    sender: broadcast::Sender<FeedFrame>,

    /// Live subscriptions by id, with their topic key.
    subscriptions: Arc<RwLock<HashMap<Uuid, String>>>,

    /// Total frames published.
    frames_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            frames_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to frames matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let id = Uuid::new_v4();
        let topic_key = format!("{:?}", filter.topics);

        if let Ok(mut subs) = self.subscriptions.write() {
            subs.insert(id, topic_key);
        }

        debug!(subscription = %id, topics = ?filter.topics, "New subscription created");

        Subscription::new(id, receiver, filter, self.subscriptions.clone())
    }

    /// Get the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.read().map(|subs| subs.len()).unwrap_or(0)
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        InMemoryEventBus::subscribe(self, filter)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, frame: FeedFrame) -> usize {
        let topic = frame.topic();

        // Always increment counter (frame was attempted)
        self.frames_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(frame) {
            Ok(receiver_count) => {
                debug!(topic = ?topic, receivers = receiver_count, "Frame published");
                receiver_count
            }
            Err(e) => {
                warn!(topic = ?topic, error = %e, "Frame dropped (no receivers)");
                0
            }
        }
    }

    fn frames_published(&self) -> u64 {
        self.frames_published.load(Ordering::Relaxed)
    }
}
