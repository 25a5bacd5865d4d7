//! # View Flows
//!
//! View lifecycle: optimistic edits, post switching, unmount and isolation
//! between views.

#[cfg(test)]
mod tests {
    use crate::harness::{bid, load_page, page, settle, Harness};
    use option_sync::{OptionPatch, PostViewApi, SyncError};
    use shared_bus::FeedFrame;
    use std::time::Duration;

    #[tokio::test]
    async fn test_optimistic_edit_overridden_by_server() {
        let harness =
            Harness::new().with_page("p1", None, page(vec![bid(1, "B", 100), bid(2, "C", 90)], None));
        let view = harness.mount("p1", Some("A"));
        load_page(&view).await.unwrap();

        // viewer backs option 2 and raises it to 130
        let changed = view
            .apply_optimistic(OptionPatch::new(2).with_support(130).supported_by_viewer(true))
            .await
            .unwrap();
        assert!(changed);
        let state = view.state();
        assert_eq!(state.ranking.ids(), vec![2, 1]);
        assert_eq!(state.ranking.leader(), Some(2));

        // server settles on 95
        harness
            .push(FeedFrame::upsert("p1", OptionPatch::new(2).with_support(95)))
            .await;
        let state = settle(&view, |s| s.frames_received == 1).await;

        assert_eq!(state.options[&2].support_metric, 95);
        assert!(state.options[&2].is_supported_by_current_user);
        assert_eq!(state.ranking.leader(), Some(1));
        assert_eq!(state.ranking.ids(), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_optimistic_edit_on_option_deleted_during_fetch_ignored() {
        let harness = Harness::new().with_page("p1", None, page(vec![bid(4, "B", 10)], None));
        harness.source.set_delay(Some(Duration::from_millis(200)));
        let view = harness.mount("p1", Some("A"));
        harness.push(FeedFrame::upsert("p1", bid(4, "B", 10))).await;
        settle(&view, |s| s.frames_received == 1).await;

        view.load_more().await.unwrap();
        harness.push(FeedFrame::deleted("p1", 4)).await;
        settle(&view, |s| s.frames_received == 2).await;

        let changed = view
            .apply_optimistic(OptionPatch::new(4).with_support(11))
            .await
            .unwrap();
        assert!(!changed);
        assert!(view.option(4).is_none());

        let state = settle(&view, |s| s.paging.exhausted).await;
        assert!(state.options.is_empty());
    }

    #[tokio::test]
    async fn test_switch_post_drops_old_state() {
        let harness = Harness::new()
            .with_page("p1", None, page(vec![bid(1, "A", 10)], None))
            .with_page("p2", None, page(vec![bid(7, "B", 70)], None));
        let view = harness.mount("p1", None);
        load_page(&view).await.unwrap();

        view.switch_post("p2").await.unwrap();
        let state = view.state();
        assert_eq!(state.post_id, "p2");
        assert!(state.options.is_empty());
        assert_eq!(harness.bus.subscriber_count(), 1);

        // straggler for the old post
        harness.push(FeedFrame::upsert("p1", bid(2, "A", 99))).await;
        harness.push(FeedFrame::upsert("p2", bid(8, "C", 1))).await;
        let state = settle(&view, |s| s.frames_received == 2).await;
        assert_eq!(state.ranking.ids(), vec![8]);

        let state = load_page(&view).await.unwrap();
        assert_eq!(state.ranking.leader(), Some(7));
        assert!(!state.options.contains_key(&1));
        assert!(!state.options.contains_key(&2));
    }

    #[tokio::test]
    async fn test_views_are_isolated() {
        let harness = Harness::new();
        let first = harness.mount("p1", Some("A"));
        let second = harness.mount("p2", Some("A"));

        harness.push(FeedFrame::upsert("p1", bid(1, "A", 5))).await;
        harness.push(FeedFrame::upsert("p2", bid(2, "B", 6))).await;

        let first_state = settle(&first, |s| s.frames_received == 2).await;
        let second_state = settle(&second, |s| s.frames_received == 2).await;

        assert_eq!(first_state.ranking.ids(), vec![1]);
        assert_eq!(second_state.ranking.ids(), vec![2]);
    }

    #[tokio::test]
    async fn test_unmount_releases_bus_subscription() {
        let harness = Harness::new();
        let view = harness.mount("p1", None);
        let other = view.clone();
        assert_eq!(harness.bus.subscriber_count(), 1);

        view.unmount().await;

        assert_eq!(harness.bus.subscriber_count(), 0);
        assert_eq!(
            other.apply_optimistic(OptionPatch::new(1)).await.unwrap_err(),
            SyncError::ViewClosed
        );
        // last published state stays readable
        assert_eq!(other.state().post_id, "p1");
    }

    #[tokio::test]
    async fn test_handle_as_port() {
        let harness =
            Harness::new().with_page("p1", None, page(vec![bid(1, "A", 1), bid(2, "B", 2)], None));
        let view = harness.mount("p1", Some("B"));
        let api: &dyn PostViewApi = &view;

        api.load_more().await.unwrap();
        settle(&view, |s| s.options.len() == 2).await;

        assert_eq!(api.snapshot().ids(), vec![2, 1]);
        assert_eq!(api.option(1).map(|o| o.support_metric), Some(1));
        assert_eq!(api.state().post_id, "p1");
    }
}
