//! # Paging Flows
//!
//! Backfill through the REST port: first page, cursor chaining, failure and
//! retry, exhaustion.

#[cfg(test)]
mod tests {
    use crate::harness::{bid, load_page, page, settle, Harness};
    use option_sync::{LoadMoreOutcome, PageCursor, SyncConfig, SyncError};
    use shared_types::TransportError;

    /// Viewer A's own bid is listed before B's leading bid.
    #[tokio::test]
    async fn test_first_page_ranked_for_viewer() {
        let harness = Harness::new().with_page(
            "p1",
            None,
            page(vec![bid(1, "A", 100), bid(2, "B", 150)], None),
        );
        let view = harness.mount("p1", Some("A"));

        let state = load_page(&view).await.unwrap();

        assert_eq!(state.ranking.ids(), vec![1, 2]);
        assert_eq!(state.ranking.leader(), Some(2));
        assert!(state.paging.exhausted);
    }

    #[tokio::test]
    async fn test_auto_load_on_mount() {
        let mut harness =
            Harness::new().with_page("p1", None, page(vec![bid(1, "A", 100)], Some("next")));
        harness.config = SyncConfig {
            auto_load_first_page: true,
            ..SyncConfig::for_testing()
        };
        let view = harness.mount("p1", None);

        let state = settle(&view, |s| s.options.len() == 1).await;

        assert!(!state.paging.exhausted);
        assert_eq!(harness.source.request_count(), 1);
    }

    #[tokio::test]
    async fn test_cursor_chain_until_exhausted() {
        let harness = Harness::new()
            .with_page("p1", None, page(vec![bid(1, "A", 1), bid(2, "B", 2)], Some("c2")))
            .with_page("p1", Some("c2"), page(vec![bid(3, "C", 3)], Some("c3")))
            .with_page("p1", Some("c3"), page(vec![bid(4, "D", 4)], None));
        let view = harness.mount("p1", None);

        for _ in 0..3 {
            load_page(&view).await.unwrap();
        }

        let state = view.state();
        assert_eq!(state.options.len(), 4);
        assert!(state.paging.exhausted);
        assert_eq!(view.load_more().await.unwrap(), LoadMoreOutcome::Exhausted);
        assert_eq!(harness.source.request_count(), 3);
    }

    /// A failure at cursor "abc" leaves the store alone; the retry ends in
    /// the same state as a view that never failed.
    #[tokio::test]
    async fn test_failure_then_retry_same_cursor() {
        let harness = Harness::new()
            .with_page("p1", None, page(vec![bid(1, "A", 100)], Some("abc")))
            .with_page("p1", Some("abc"), page(vec![bid(2, "B", 150)], None));
        let flaky = harness.mount("p1", Some("A"));
        let steady = harness.mount("p1", Some("A"));

        load_page(&flaky).await.unwrap();
        let before = flaky.state();

        harness
            .source
            .fail_next(TransportError::Network("connection reset".into()));
        let err = load_page(&flaky).await.unwrap_err();

        assert_eq!(
            err,
            SyncError::FetchFailed {
                cursor: PageCursor::Next("abc".to_string()),
                reason: "Network error: connection reset".to_string(),
            }
        );
        assert!(err.is_retryable());
        let after_failure = flaky.state();
        assert_eq!(after_failure.options, before.options);
        assert_eq!(after_failure.ranking.ids(), before.ranking.ids());

        let retried = load_page(&flaky).await.unwrap();

        load_page(&steady).await.unwrap();
        let clean = load_page(&steady).await.unwrap();

        assert_eq!(retried.options, clean.options);
        assert_eq!(retried.ranking.ids(), clean.ranking.ids());
        assert!(retried.paging.last_error.is_none());
    }

    #[tokio::test]
    async fn test_unknown_page_reports_server_error() {
        let harness = Harness::new();
        let view = harness.mount("p1", None);

        let err = load_page(&view).await.unwrap_err();

        assert!(matches!(
            err,
            SyncError::FetchFailed {
                cursor: PageCursor::Start,
                ..
            }
        ));
        assert!(view.state().options.is_empty());
    }
}
