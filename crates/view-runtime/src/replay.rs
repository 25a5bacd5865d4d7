//! Fixture replay against the in-memory transports.

use crate::fixture::Fixture;
use anyhow::{bail, Context, Result};
use option_sync::{
    InMemoryPageSource, LoadMoreOutcome, PostView, SyncConfig, SyncState, ViewState,
};
use shared_bus::{EventPublisher, FeedTopic, InMemoryEventBus, DEFAULT_CHANNEL_CAPACITY};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Replay tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOptions {
    /// Upper bound for each wait on the view.
    pub step_timeout: Duration,

    /// Frames the replay bus buffers per subscriber before the oldest are
    /// overwritten.
    pub feed_capacity: usize,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            step_timeout: Duration::from_secs(10),
            feed_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ReplayOptions {
    /// Defaults overridden by `SYNC_FEED_CAPACITY`. Zero is ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            feed_capacity: std::env::var("SYNC_FEED_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|capacity| *capacity > 0)
                .unwrap_or(defaults.feed_capacity),
            ..defaults
        }
    }
}

/// Replay `fixture` and return the view's final state.
///
/// Fails if a page request fails or the view does not settle within
/// `options.step_timeout`.
pub async fn replay(fixture: Fixture, options: ReplayOptions) -> Result<ViewState> {
    let config = SyncConfig {
        auto_load_first_page: false,
        ..fixture.config.clone().unwrap_or_else(SyncConfig::from_env)
    };

    let source = Arc::new(InMemoryPageSource::new());
    for page in &fixture.pages {
        source.insert_page(
            fixture.post_id.clone(),
            page.cursor.as_deref(),
            page.response.clone(),
        );
    }
    let bus = Arc::new(InMemoryEventBus::with_capacity(options.feed_capacity));

    let view = PostView::mount(
        config,
        fixture.post_id.clone(),
        fixture.current_user.clone(),
        source,
        Arc::clone(&bus) as Arc<dyn shared_bus::EventSubscriber>,
    )
    .context("failed to mount post view")?;

    // Paging
    for _ in 0..=fixture.pages.len() {
        match view.load_more().await? {
            LoadMoreOutcome::Exhausted => break,
            LoadMoreOutcome::AlreadyLoading => bail!("view was already loading"),
            LoadMoreOutcome::Started(ticket) => {
                debug!(cursor = %ticket.cursor, "Replaying page");
                let state = tokio::time::timeout(
                    options.step_timeout,
                    view.wait_until(|s| s.paging.state != SyncState::FetchingPage),
                )
                .await
                .context("timed out waiting for page")??;
                if let Some(error) = state.paging.last_error {
                    bail!("page at cursor {} failed: {}", ticket.cursor, error);
                }
            }
        }
    }

    // Local edits
    for patch in fixture.optimistic {
        view.apply_optimistic(patch).await?;
    }

    // Push frames. If the bus overruns, the view rebuilds from page one
    // instead of seeing every frame.
    let before = view.state();
    let expected = before.frames_received
        + fixture
            .frames
            .iter()
            .filter(|f| f.topic() == FeedTopic::Options)
            .count() as u64;
    for frame in fixture.frames {
        bus.publish(frame).await;
    }
    let state = tokio::time::timeout(
        options.step_timeout,
        view.wait_until(|s| {
            s.frames_received >= expected
                || (s.paging.resyncs > before.paging.resyncs && !s.paging.stale)
        }),
    )
    .await
    .context("timed out waiting for frames")??;

    view.unmount().await;
    info!(
        post_id = %state.post_id,
        options = state.options.len(),
        revision = state.ranking.revision,
        "Replay complete"
    );
    Ok(state)
}
