//! # Post View
//!
//! One tokio task per mounted post. The task owns the `Reconciler` and
//! multiplexes three inputs:
//!
//! - commands from `PostViewHandle` (load more, optimistic edit, switch)
//! - page results posted back by the spawned fetch task
//! - frames from the push feed
//!
//! Only the fetch task suspends on I/O, so deltas keep applying while a page
//! is outstanding. Every applied batch publishes a fresh `ViewState` on a
//! `watch` channel.

use crate::adapters::{DeltaFeedListener, FeedItem};
use crate::application::{PageFetcher, Reconciler};
use crate::config::{ConfigError, SyncConfig};
use crate::domain::{
    FetchTicket, LoadMoreOutcome, OptionId, OptionPage, OptionPatch, PostId, RankingSnapshot,
    SyncError, UserId, ViewState, VoteOption,
};
use crate::ports::{OptionPageSource, PostViewApi};
use async_trait::async_trait;
use shared_bus::EventSubscriber;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Capacity of the internal page-result queue.
const PAGE_RESULT_CAPACITY: usize = 4;

/// Requests from handles to the view task.
#[derive(Debug)]
enum ViewCommand {
    LoadMore {
        reply: oneshot::Sender<LoadMoreOutcome>,
    },
    Optimistic {
        patch: OptionPatch,
        reply: oneshot::Sender<bool>,
    },
    SwitchPost {
        post_id: PostId,
        reply: oneshot::Sender<()>,
    },
    Shutdown,
}

/// Result posted back by a fetch task.
struct PageLoaded {
    ticket: FetchTicket,
    result: Result<OptionPage, SyncError>,
}

/// What woke the view task.
enum Wakeup {
    Command(ViewCommand),
    Page(PageLoaded),
    Feed(Option<FeedItem>),
    Closed,
}

/// The view task. Created by `PostView::mount`.
pub struct PostView {
    config: SyncConfig,
    current_user: Option<UserId>,
    reconciler: Reconciler,
    fetcher: PageFetcher<dyn OptionPageSource>,
    feed: Arc<dyn EventSubscriber>,
    listener: Option<DeltaFeedListener>,
    fetch_task: Option<JoinHandle<()>>,
    commands: mpsc::Receiver<ViewCommand>,
    pages_tx: mpsc::Sender<PageLoaded>,
    pages_rx: mpsc::Receiver<PageLoaded>,
    state_tx: watch::Sender<ViewState>,
}

impl PostView {
    /// Mount a view of `post_id` and spawn its task.
    ///
    /// Subscribes to the feed before returning, so frames published after
    /// `mount` returns are seen. Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `config` fails validation.
    pub fn mount(
        config: SyncConfig,
        post_id: impl Into<PostId>,
        current_user: Option<UserId>,
        source: Arc<dyn OptionPageSource>,
        feed: Arc<dyn EventSubscriber>,
    ) -> Result<PostViewHandle, ConfigError> {
        let (mut view, handle) = Self::new(config, post_id, current_user, source, feed)?;
        if view.config.auto_load_first_page {
            view.load_more();
        }
        tokio::spawn(view.run());
        Ok(handle)
    }

    fn new(
        config: SyncConfig,
        post_id: impl Into<PostId>,
        current_user: Option<UserId>,
        source: Arc<dyn OptionPageSource>,
        feed: Arc<dyn EventSubscriber>,
    ) -> Result<(Self, PostViewHandle), ConfigError> {
        config.validate()?;
        let post_id = post_id.into();

        let (commands_tx, commands) = mpsc::channel(config.command_queue_capacity);
        let (pages_tx, pages_rx) = mpsc::channel(PAGE_RESULT_CAPACITY);
        let reconciler = Reconciler::new(post_id.clone(), current_user.clone());
        let (state_tx, state_rx) = watch::channel(reconciler.view_state());
        let listener = DeltaFeedListener::subscribe(feed.as_ref(), post_id.clone());
        let fetcher = PageFetcher::new(source, config.page_size, config.fetch_timeout());

        let view = Self {
            config,
            current_user,
            reconciler,
            fetcher,
            feed,
            listener: Some(listener),
            fetch_task: None,
            commands,
            pages_tx,
            pages_rx,
            state_tx,
        };
        info!(post_id = %post_id, viewer = ?view.current_user, "[option-sync] Post view mounted");

        let handle = PostViewHandle {
            commands: commands_tx,
            state: state_rx,
        };
        Ok((view, handle))
    }

    #[instrument(name = "post_view", skip_all)]
    async fn run(mut self) {
        loop {
            let wakeup = tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => Wakeup::Command(command),
                    None => Wakeup::Closed,
                },
                Some(loaded) = self.pages_rx.recv() => Wakeup::Page(loaded),
                item = next_feed_item(&mut self.listener) => Wakeup::Feed(item),
            };

            match wakeup {
                Wakeup::Command(ViewCommand::Shutdown) | Wakeup::Closed => break,
                Wakeup::Command(command) => self.handle_command(command),
                Wakeup::Page(loaded) => self.handle_page(loaded),
                Wakeup::Feed(Some(item)) => self.handle_feed_item(item),
                Wakeup::Feed(None) => {
                    warn!(post_id = %self.reconciler.post_id(), "[option-sync] Feed closed, continuing without live updates");
                    self.listener = None;
                }
            }
        }

        self.abort_fetch();
        if let Some(listener) = self.listener.take() {
            listener.unsubscribe();
        }
        info!(post_id = %self.reconciler.post_id(), "[option-sync] Post view unmounted");
    }

    fn handle_command(&mut self, command: ViewCommand) {
        match command {
            ViewCommand::LoadMore { reply } => {
                let outcome = self.load_more();
                let _ = reply.send(outcome);
            }
            ViewCommand::Optimistic { patch, reply } => {
                let changed = self.reconciler.apply_optimistic(patch);
                if changed {
                    self.publish();
                }
                let _ = reply.send(changed);
            }
            ViewCommand::SwitchPost { post_id, reply } => {
                self.switch_post(post_id);
                let _ = reply.send(());
            }
            ViewCommand::Shutdown => {}
        }
    }

    fn load_more(&mut self) -> LoadMoreOutcome {
        let outcome = self.reconciler.begin_load_more();
        if let LoadMoreOutcome::Started(ticket) = &outcome {
            let fetcher = self.fetcher.clone();
            let pages_tx = self.pages_tx.clone();
            let ticket = ticket.clone();
            self.fetch_task = Some(tokio::spawn(async move {
                let result = fetcher.fetch_next_page(&ticket.post_id, &ticket.cursor).await;
                let _ = pages_tx.send(PageLoaded { ticket, result }).await;
            }));
            self.publish();
        }
        outcome
    }

    fn handle_page(&mut self, loaded: PageLoaded) {
        let PageLoaded { ticket, result } = loaded;
        if !self.reconciler.is_pending(&ticket) {
            debug!(post_id = %ticket.post_id, ticket = %ticket.id, "[option-sync] Dropping page for an abandoned request");
            return;
        }
        if let Err(e) = self.reconciler.complete_load_more(&ticket, result) {
            debug!(post_id = %ticket.post_id, retryable = e.is_retryable(), "[option-sync] Page not applied: {}", e);
        }
        self.fetch_task = None;
        self.publish();
    }

    fn handle_feed_item(&mut self, item: FeedItem) {
        match item {
            FeedItem::Lagged(missed) => self.resync(missed),
            FeedItem::Delta(delta) => {
                self.reconciler.record_frame();
                if let Err(e) = self.reconciler.apply_delta(delta) {
                    debug!(error = %e, "[option-sync] Delta rejected");
                }
                self.publish();
            }
            FeedItem::Dropped(_) => {
                self.reconciler.record_frame();
                self.publish();
            }
        }
    }

    /// Rebuild from the first page after the feed lost deltas.
    fn resync(&mut self, missed: u64) {
        self.abort_fetch();
        self.fetcher = self.fetcher.restarted();
        self.reconciler.resync(missed);
        self.publish();
        self.load_more();
    }

    fn switch_post(&mut self, post_id: PostId) {
        if post_id == self.reconciler.post_id() {
            return;
        }
        info!(from = %self.reconciler.post_id(), to = %post_id, "[option-sync] Switching post");

        self.abort_fetch();
        if let Some(listener) = self.listener.take() {
            listener.unsubscribe();
        }

        self.reconciler = Reconciler::new(post_id.clone(), self.current_user.clone());
        self.listener = Some(DeltaFeedListener::subscribe(self.feed.as_ref(), post_id));
        self.publish();

        if self.config.auto_load_first_page {
            self.load_more();
        }
    }

    fn abort_fetch(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.reconciler.view_state());
    }
}

async fn next_feed_item(listener: &mut Option<DeltaFeedListener>) -> Option<FeedItem> {
    match listener {
        Some(listener) => listener.next().await,
        None => std::future::pending().await,
    }
}

/// Cloneable handle to a mounted post view.
///
/// The view stops when `unmount` is called or every handle is dropped.
#[derive(Clone)]
pub struct PostViewHandle {
    commands: mpsc::Sender<ViewCommand>,
    state: watch::Receiver<ViewState>,
}

impl PostViewHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> ViewCommand,
    ) -> Result<T, SyncError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| SyncError::ViewClosed)?;
        response.await.map_err(|_| SyncError::ViewClosed)
    }

    /// Request the next page.
    ///
    /// Returns as soon as the request is issued; the merged page shows up in
    /// a later state.
    pub async fn load_more(&self) -> Result<LoadMoreOutcome, SyncError> {
        self.request(|reply| ViewCommand::LoadMore { reply }).await
    }

    /// Apply a local edit ahead of server confirmation.
    pub async fn apply_optimistic(&self, patch: OptionPatch) -> Result<bool, SyncError> {
        self.request(|reply| ViewCommand::Optimistic { patch, reply })
            .await
    }

    /// View another post. The old store and subscription are dropped.
    pub async fn switch_post(&self, post_id: impl Into<PostId>) -> Result<(), SyncError> {
        let post_id = post_id.into();
        self.request(|reply| ViewCommand::SwitchPost { post_id, reply })
            .await
    }

    /// Latest published state.
    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Latest display order.
    pub fn snapshot(&self) -> RankingSnapshot {
        self.state.borrow().ranking.clone()
    }

    /// Look up one option by id.
    pub fn option(&self, id: OptionId) -> Option<VoteOption> {
        self.state.borrow().options.get(&id).cloned()
    }

    /// Receiver notified on every published state.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.clone()
    }

    /// Wait until the published state satisfies `predicate`.
    pub async fn wait_until(
        &self,
        predicate: impl FnMut(&ViewState) -> bool,
    ) -> Result<ViewState, SyncError> {
        let mut state = self.state.clone();
        let matched = state
            .wait_for(predicate)
            .await
            .map_err(|_| SyncError::ViewClosed)?;
        Ok(matched.clone())
    }

    /// Whether the view task has stopped.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// Stop the view task and release its feed subscription.
    pub async fn unmount(self) {
        if self.commands.send(ViewCommand::Shutdown).await.is_err() {
            debug!("[option-sync] Post view already stopped");
        }
        self.commands.closed().await;
    }
}

#[async_trait]
impl PostViewApi for PostViewHandle {
    async fn load_more(&self) -> Result<LoadMoreOutcome, SyncError> {
        PostViewHandle::load_more(self).await
    }

    async fn apply_optimistic(&self, patch: OptionPatch) -> Result<bool, SyncError> {
        PostViewHandle::apply_optimistic(self, patch).await
    }

    async fn switch_post(&self, post_id: PostId) -> Result<(), SyncError> {
        PostViewHandle::switch_post(self, post_id).await
    }

    fn state(&self) -> ViewState {
        PostViewHandle::state(self)
    }

    fn snapshot(&self) -> RankingSnapshot {
        PostViewHandle::snapshot(self)
    }

    fn option(&self, id: OptionId) -> Option<VoteOption> {
        PostViewHandle::option(self, id)
    }
}
