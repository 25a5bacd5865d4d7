//! In-Memory Page Source
//!
//! Implements `OptionPageSource` from a table of canned pages. Used by the
//! integration tests and the fixture replay runtime.

use crate::ports::outbound::OptionPageSource;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{OptionsPageResponse, PostId, TransportError};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

type PageKey = (PostId, Option<String>);

/// Canned REST transport.
///
/// Pages are keyed by post and request cursor. Queued failures are returned
/// before any page, one per request.
#[derive(Default)]
pub struct InMemoryPageSource {
    pages: Mutex<HashMap<PageKey, OptionsPageResponse>>,
    failures: Mutex<VecDeque<TransportError>>,
    delay: Mutex<Option<Duration>>,
    requests: AtomicU64,
}

impl InMemoryPageSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the page returned for `(post_id, cursor)`.
    pub fn insert_page(
        &self,
        post_id: impl Into<PostId>,
        cursor: Option<&str>,
        page: OptionsPageResponse,
    ) {
        self.pages
            .lock()
            .insert((post_id.into(), cursor.map(str::to_owned)), page);
    }

    /// Builder form of `insert_page`.
    #[must_use]
    pub fn with_page(
        self,
        post_id: impl Into<PostId>,
        cursor: Option<&str>,
        page: OptionsPageResponse,
    ) -> Self {
        self.insert_page(post_id, cursor, page);
        self
    }

    /// Fail the next request with `error`.
    pub fn fail_next(&self, error: TransportError) {
        self.failures.lock().push_back(error);
    }

    /// Delay every response by `delay`.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock() = delay;
    }

    /// Number of requests served, including failed ones.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OptionPageSource for InMemoryPageSource {
    async fn fetch_options_page(
        &self,
        post_id: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<OptionsPageResponse, TransportError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        debug!(post_id, cursor = ?cursor, limit, "[option-sync] In-memory page request");

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }

        let key = (post_id.to_string(), cursor.map(str::to_owned));
        let mut page = self
            .pages
            .lock()
            .get(&key)
            .cloned()
            .ok_or_else(|| TransportError::Server {
                status: 404,
                message: format!("no page for post {} at cursor {:?}", post_id, cursor),
            })?;
        page.options.truncate(limit);
        Ok(page)
    }
}
