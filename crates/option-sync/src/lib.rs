//! # Option Sync
//!
//! Live synchronization and ranking of options (auction bids and
//! multiple-choice votes) for a single post view.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Three asynchronous producers feed one post view:
//! - cursor-paginated REST pages (backfill)
//! - push deltas from the feed bus (live updates)
//! - optimistic local edits (the viewer just bid or voted)
//!
//! The view folds all of them into one duplicate-free option store and
//! recomputes a ranking after every applied batch.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | One record per option id | `domain/store.rs` - `BTreeMap` keyed by id |
//! | Identity fields never replaced | `domain/entities.rs` - `VoteOption::merge` |
//! | Exactly one leader when non-empty | `algorithms/ranking.rs` - `rank()` |
//! | Every option ranked exactly once | `algorithms/ranking.rs` - first-occurrence dedup |
//! | One page fetch in flight per post | `application/page_fetcher.rs` - `InFlightGuard` |
//! | Deltas for other posts never applied | `adapters/feed.rs` + `application/reconciler.rs` |
//!
//! ## Module Structure
//!
//! ```text
//! option-sync/
//! ├── domain/          # VoteOption, OptionStore, RankingSnapshot, SyncError
//! ├── algorithms/      # rank(), find_leader()
//! ├── ports/           # PostViewApi (inbound) + OptionPageSource (outbound)
//! ├── adapters/        # Feed listener on shared-bus, in-memory page source
//! ├── application/     # PageFetcher, Reconciler, PostView actor
//! └── config.rs        # SyncConfig
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! PageFetcher ──PageLoaded──┐
//!                           ▼
//! DeltaFeedListener ──Delta──→ PostView actor ──→ Reconciler ──→ rank() ──→ watch<ViewState>
//!                           ▲
//! PostViewHandle ──Optimistic┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{decode_frame, DeltaFeedListener, DropReason, FeedItem, InMemoryPageSource};
pub use algorithms::{find_leader, rank};
pub use application::{PageFetcher, PostView, PostViewHandle, Reconciler};
pub use config::{ConfigError, SyncConfig};
pub use domain::{
    Delta, FetchTicket, LoadMoreOutcome, OptionId, OptionKind, OptionPage, OptionPatch,
    OptionStore, PageCursor, PagingStatus, PostId, RankedEntry, RankingSnapshot, SyncError,
    SyncState, UpsertOutcome, UserId, ViewState, VoteOption,
};
pub use ports::{OptionPageSource, PostViewApi};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
