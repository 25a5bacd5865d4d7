//! Shared setup for integration flows.

use option_sync::{
    InMemoryPageSource, OptionPatch, PostView, PostViewHandle, SyncConfig, SyncError, ViewState,
};
use shared_bus::{EventPublisher, FeedFrame, InMemoryEventBus};
use shared_types::OptionsPageResponse;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound for any single wait on a view.
pub const WAIT: Duration = Duration::from_secs(5);

/// A bid patch.
pub fn bid(id: u64, creator: &str, amount: u64) -> OptionPatch {
    OptionPatch::new(id)
        .with_creator(creator)
        .with_support(amount)
}

/// A page response.
pub fn page(options: Vec<OptionPatch>, next: Option<&str>) -> OptionsPageResponse {
    OptionsPageResponse {
        options,
        next_cursor: next.map(str::to_owned),
    }
}

/// Bus, page source and views mounted on them.
pub struct Harness {
    pub bus: Arc<InMemoryEventBus>,
    pub source: Arc<InMemoryPageSource>,
    pub config: SyncConfig,
}

impl Harness {
    /// Empty transports with the test config (no auto-load).
    pub fn new() -> Self {
        Self {
            bus: Arc::new(InMemoryEventBus::new()),
            source: Arc::new(InMemoryPageSource::new()),
            config: SyncConfig::for_testing(),
        }
    }

    /// Replace the bus with one buffering only `capacity` frames per view.
    pub fn with_bus_capacity(mut self, capacity: usize) -> Self {
        self.bus = Arc::new(InMemoryEventBus::with_capacity(capacity));
        self
    }

    /// Register a page.
    pub fn with_page(self, post_id: &str, cursor: Option<&str>, response: OptionsPageResponse) -> Self {
        self.source.insert_page(post_id, cursor, response);
        self
    }

    /// Mount a view of `post_id` for `viewer`.
    pub fn mount(&self, post_id: &str, viewer: Option<&str>) -> PostViewHandle {
        PostView::mount(
            self.config.clone(),
            post_id,
            viewer.map(str::to_owned),
            Arc::clone(&self.source) as Arc<dyn option_sync::OptionPageSource>,
            Arc::clone(&self.bus) as Arc<dyn shared_bus::EventSubscriber>,
        )
        .expect("test config is valid")
    }

    /// Publish a frame on the bus.
    pub async fn push(&self, frame: FeedFrame) {
        self.bus.publish(frame).await;
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for `predicate`, failing the test after `WAIT`.
pub async fn settle(
    view: &PostViewHandle,
    predicate: impl FnMut(&ViewState) -> bool,
) -> ViewState {
    tokio::time::timeout(WAIT, view.wait_until(predicate))
        .await
        .expect("view did not settle in time")
        .expect("view closed while waiting")
}

/// Issue a load and wait until it finishes, successfully or not.
pub async fn load_page(view: &PostViewHandle) -> Result<ViewState, SyncError> {
    let outcome = view.load_more().await?;
    if !matches!(outcome, option_sync::LoadMoreOutcome::Started(_)) {
        return Ok(view.state());
    }
    let state = settle(view, |s| s.paging.state != option_sync::SyncState::FetchingPage).await;
    match state.paging.last_error.clone() {
        Some(error) => Err(error),
        None => Ok(state),
    }
}
