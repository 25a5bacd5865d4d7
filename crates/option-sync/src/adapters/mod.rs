//! # Adapters Layer (Hexagonal Architecture)
//!
//! Connects the view to its transports: the push feed on `shared-bus` and
//! an in-memory page source for tests and fixture replay.

mod feed;
mod memory_source;

pub use feed::{decode_frame, DeltaFeedListener, DropReason, FeedItem};
pub use memory_source::InMemoryPageSource;
