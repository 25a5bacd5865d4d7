//! # Shared Bus - Push Feed for Post Views
//!
//! In-process stand-in for the platform's socket transport. Producers
//! publish raw `FeedFrame`s; post views subscribe by topic and decode the
//! frames themselves.
//!
//! ## Delivery Rules
//!
//! - Frames are **not** scoped to a post. Subscribers must filter by post id.
//! - Delivery is at-least-once from the consumer's point of view; duplicates
//!   must be tolerated downstream.
//! - Payloads are opaque JSON. A malformed payload is the consumer's problem,
//!   never the bus's.
//!
//! ```text
//! ┌──────────────┐   publish()   ┌──────────────┐  subscribe()  ┌──────────────┐
//! │  Producer    │ ────────────→ │   Feed Bus   │ ────────────→ │  Post View   │
//! └──────────────┘               └──────────────┘               └──────────────┘
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, FeedFrame, FeedTopic};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventSubscriber, Subscription, SubscriptionError};

/// Maximum frames to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
