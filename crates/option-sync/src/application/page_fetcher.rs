//! # Page Fetcher
//!
//! Requests one page at a time from the REST transport.
//!
//! At most one request per post is outstanding. The in-flight marker is
//! owned by an `InFlightGuard`, so it is released even when the fetch
//! future is dropped mid-request.

use crate::domain::{OptionPage, PageCursor, PostId, SyncError};
use crate::ports::OptionPageSource;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use sync_telemetry::metrics::{PAGES_FETCHED, PAGE_FAILURES};
use tracing::{debug, warn};

/// Paginated fetch over an `OptionPageSource`.
pub struct PageFetcher<S: OptionPageSource + ?Sized> {
    source: Arc<S>,
    page_size: usize,
    timeout: Duration,
    in_flight: Arc<Mutex<HashSet<PostId>>>,
}

impl<S: OptionPageSource + ?Sized> Clone for PageFetcher<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            page_size: self.page_size,
            timeout: self.timeout,
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

/// Marks a post as having a fetch outstanding until dropped.
struct InFlightGuard {
    post_id: PostId,
    in_flight: Arc<Mutex<HashSet<PostId>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.post_id);
    }
}

impl<S: OptionPageSource + ?Sized> PageFetcher<S> {
    /// Create a fetcher requesting `page_size` options per page.
    pub fn new(source: Arc<S>, page_size: usize, timeout: Duration) -> Self {
        Self {
            source,
            page_size,
            timeout,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Same source and limits, with no request outstanding.
    ///
    /// Used when the owner abandons its outstanding request: the aborted
    /// task releases its marker in the old set whenever it is dropped.
    pub fn restarted(&self) -> Self {
        Self::new(Arc::clone(&self.source), self.page_size, self.timeout)
    }

    /// Options requested per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Whether a fetch for `post_id` is outstanding.
    pub fn is_in_flight(&self, post_id: &str) -> bool {
        self.in_flight.lock().contains(post_id)
    }

    fn acquire(&self, post_id: &str) -> Option<InFlightGuard> {
        let mut in_flight = self.in_flight.lock();
        if !in_flight.insert(post_id.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            post_id: post_id.to_string(),
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Fetch the page at `cursor` for `post_id`.
    ///
    /// # Errors
    ///
    /// - `PagesExhausted` if `cursor` is exhausted (no request is made)
    /// - `FetchInProgress` if another fetch for the post is outstanding
    /// - `FetchFailed` on transport error or timeout, carrying `cursor` so
    ///   the same request can be retried
    pub async fn fetch_next_page(
        &self,
        post_id: &str,
        cursor: &PageCursor,
    ) -> Result<OptionPage, SyncError> {
        if cursor.is_exhausted() {
            return Err(SyncError::PagesExhausted);
        }

        let Some(_guard) = self.acquire(post_id) else {
            PAGE_FAILURES.with_label_values(&["in_progress"]).inc();
            return Err(SyncError::FetchInProgress {
                post_id: post_id.to_string(),
            });
        };

        debug!(post_id, cursor = %cursor, limit = self.page_size, "[option-sync] Fetching page");

        let request = self
            .source
            .fetch_options_page(post_id, cursor.token(), self.page_size);

        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => {
                PAGES_FETCHED.inc();
                let page = OptionPage::from(response);
                debug!(
                    post_id,
                    options = page.options.len(),
                    next = %page.next_cursor,
                    "[option-sync] Page fetched"
                );
                Ok(page)
            }
            Ok(Err(e)) => {
                PAGE_FAILURES.with_label_values(&["transport"]).inc();
                warn!(post_id, cursor = %cursor, error = %e, "[option-sync] Page fetch failed");
                Err(SyncError::FetchFailed {
                    cursor: cursor.clone(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                PAGE_FAILURES.with_label_values(&["timeout"]).inc();
                warn!(post_id, cursor = %cursor, timeout = ?self.timeout, "[option-sync] Page fetch timed out");
                Err(SyncError::FetchFailed {
                    cursor: cursor.clone(),
                    reason: format!("timed out after {:?}", self.timeout),
                })
            }
        }
    }
}
