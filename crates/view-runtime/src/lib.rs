//! # View Runtime Library
//!
//! Fixture loading and replay for the `view-runtime` binary, exposed for
//! testing.
//!
//! ## Replay Sequence
//!
//! 1. Register the fixture's pages with an `InMemoryPageSource`
//! 2. Mount a `PostView` on an `InMemoryEventBus`
//! 3. Load pages until the cursor is exhausted
//! 4. Apply the fixture's optimistic edits
//! 5. Publish the fixture's frames and wait until the view has seen them
//! 6. Unmount and return the final `ViewState`

pub mod fixture;
pub mod replay;

pub use fixture::{Fixture, FixturePage};
pub use replay::{replay, ReplayOptions};
