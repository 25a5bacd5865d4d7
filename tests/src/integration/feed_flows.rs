//! # Feed Flows
//!
//! Push deltas arriving alongside, before and after page backfill.

#[cfg(test)]
mod tests {
    use crate::harness::{bid, load_page, page, settle, Harness};
    use option_sync::{OptionPatch, SyncState};
    use shared_bus::FeedFrame;
    use shared_types::OPTION_UPSERT_EVENT;
    use std::time::Duration;

    #[tokio::test]
    async fn test_delta_applies_during_in_flight_fetch() {
        let harness =
            Harness::new().with_page("p1", None, page(vec![bid(1, "A", 100)], None));
        harness.source.set_delay(Some(Duration::from_millis(300)));
        let view = harness.mount("p1", None);

        view.load_more().await.unwrap();
        harness.push(FeedFrame::upsert("p1", bid(9, "Z", 500))).await;

        let state = settle(&view, |s| s.options.contains_key(&9)).await;
        assert_eq!(state.paging.state, SyncState::FetchingPage);
        assert_eq!(state.ranking.leader(), Some(9));

        let state = settle(&view, |s| s.options.len() == 2).await;
        assert_eq!(state.ranking.ids(), vec![9, 1]);
    }

    #[tokio::test]
    async fn test_foreign_and_malformed_frames_dropped() {
        let harness = Harness::new();
        let view = harness.mount("p1", None);

        harness.push(FeedFrame::upsert("p2", bid(1, "A", 1))).await;
        harness
            .push(FeedFrame::new(
                OPTION_UPSERT_EVENT,
                serde_json::json!({"postId": "p1", "option": {"supportMetric": "lots"}}),
            ))
            .await;
        harness.push(FeedFrame::upsert("p1", bid(2, "B", 2))).await;

        let state = settle(&view, |s| s.frames_received == 3).await;

        assert_eq!(state.ranking.ids(), vec![2]);
        assert!(state.options.get(&1).is_none());
    }

    /// Delete of id 42 on an empty store, then a page still listing 42.
    #[tokio::test]
    async fn test_delete_before_fetch_leaves_page_intact() {
        let harness = Harness::new().with_page(
            "p1",
            None,
            page(vec![bid(41, "A", 10), bid(42, "B", 20)], None),
        );
        let view = harness.mount("p1", None);

        harness.push(FeedFrame::deleted("p1", 42)).await;
        let state = settle(&view, |s| s.frames_received == 1).await;
        assert!(state.options.is_empty());
        assert_eq!(state.ranking.revision, 0);

        let state = load_page(&view).await.unwrap();

        assert_eq!(state.ranking.ids(), vec![42, 41]);
        assert_eq!(state.ranking.leader(), Some(42));
    }

    #[tokio::test]
    async fn test_delete_during_fetch_not_resurrected() {
        let harness = Harness::new().with_page(
            "p1",
            None,
            page(vec![bid(41, "A", 10), bid(42, "B", 20)], None),
        );
        harness.source.set_delay(Some(Duration::from_millis(200)));
        let view = harness.mount("p1", None);

        harness.push(FeedFrame::upsert("p1", bid(42, "B", 20))).await;
        settle(&view, |s| s.options.contains_key(&42)).await;

        view.load_more().await.unwrap();
        harness.push(FeedFrame::deleted("p1", 42)).await;
        let state = settle(&view, |s| s.frames_received == 2).await;
        assert!(state.options.is_empty());

        let state = settle(&view, |s| s.paging.exhausted).await;
        assert_eq!(state.ranking.ids(), vec![41]);
    }

    #[tokio::test]
    async fn test_lagged_feed_rebuilds_from_server() {
        let harness = Harness::new()
            .with_bus_capacity(2)
            .with_page(
                "p1",
                None,
                page((1..=5).map(|id| bid(id, "B", id)).collect(), None),
            );
        let view = harness.mount("p1", None);

        for id in 1..=5 {
            harness.push(FeedFrame::upsert("p1", bid(id, "B", id))).await;
        }

        let state = settle(&view, |s| s.paging.resyncs == 1 && !s.paging.stale).await;

        assert_eq!(state.options.len(), 5);
        assert_eq!(state.ranking.leader(), Some(5));
        assert!(state.paging.last_error.is_none());
        assert_eq!(harness.source.request_count(), 1);
    }

    #[tokio::test]
    async fn test_pushed_upsert_after_delete_reinserts() {
        let harness = Harness::new();
        let view = harness.mount("p1", None);

        harness.push(FeedFrame::upsert("p1", bid(5, "A", 10))).await;
        harness.push(FeedFrame::deleted("p1", 5)).await;
        harness.push(FeedFrame::upsert("p1", bid(5, "A", 12))).await;

        let state = settle(&view, |s| s.frames_received == 3).await;

        assert_eq!(state.options.get(&5).map(|o| o.support_metric), Some(12));
    }

    #[tokio::test]
    async fn test_duplicate_delivery_is_idempotent() {
        let harness = Harness::new();
        let view = harness.mount("p1", Some("A"));
        let frame = FeedFrame::upsert(
            "p1",
            OptionPatch::new(3)
                .with_creator("B")
                .with_support(30)
                .supported_by_viewer(true),
        );

        harness.push(frame.clone()).await;
        let once = settle(&view, |s| s.frames_received == 1).await;
        harness.push(frame).await;
        let twice = settle(&view, |s| s.frames_received == 2).await;

        assert_eq!(once.options, twice.options);
        assert_eq!(once.ranking, twice.ranking);
    }

    #[tokio::test]
    async fn test_partial_delta_keeps_known_fields() {
        let harness = Harness::new().with_page(
            "p1",
            None,
            page(vec![bid(1, "A", 100).with_title("Lamp")], None),
        );
        let view = harness.mount("p1", None);
        load_page(&view).await.unwrap();

        harness
            .push(FeedFrame::upsert("p1", OptionPatch::new(1).with_support(175)))
            .await;
        let state = settle(&view, |s| s.frames_received == 1).await;

        let option = &state.options[&1];
        assert_eq!(option.support_metric, 175);
        assert_eq!(option.title.as_deref(), Some("Lamp"));
        assert!(option.is_created_by("A"));
    }
}
