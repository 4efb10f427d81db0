//! Per-chat view actor.
//!
//! Owns one [`MessageListView`]: subscribes to the chat-scoped stream, seeds
//! from history page 0 and serves "load older" requests. Closing the handle
//! cancels the in-flight page fetch and releases the subscription.

use std::sync::Arc;

use futures::future::{BoxFuture, OptionFuture};
use futures::FutureExt;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use parley_net::ChatRepository;
use parley_shared::error::{ApiError, ApiResult, ErrorKind};
use parley_shared::models::Message;
use parley_shared::types::{ChatId, UserId};

use crate::backoff::Backoff;
use crate::error::SyncError;
use crate::message_view::MessageListView;
use crate::{Applied, Phase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatViewSnapshot {
    pub chat_id: ChatId,
    pub phase: Phase,
    /// Oldest first.
    pub messages: Vec<Message>,
    /// No older history left to load.
    pub exhausted: bool,
    /// The chat was deleted or the user is no longer a participant.
    pub removed: bool,
    pub error: Option<ApiError>,
}

impl ChatViewSnapshot {
    fn empty(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            phase: Phase::Unopened,
            messages: Vec::new(),
            exhausted: false,
            removed: false,
            error: None,
        }
    }
}

type Reply = oneshot::Sender<Result<Vec<Message>, SyncError>>;

#[derive(Debug)]
enum ViewCommand {
    LoadOlder(Reply),
    Refresh,
    Close,
}

#[derive(Debug)]
pub struct ChatViewHandle {
    chat_id: ChatId,
    commands: mpsc::Sender<ViewCommand>,
    snapshot: watch::Receiver<ChatViewSnapshot>,
    task: JoinHandle<()>,
}

impl ChatViewHandle {
    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn snapshot(&self) -> ChatViewSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatViewSnapshot> {
        self.snapshot.clone()
    }

    /// Fetch the next older page and return the whole cached list. Once the
    /// history is exhausted this answers from cache without a network call.
    ///
    /// The returned future does not borrow the handle, so the view can be
    /// closed while a page is in flight; the request then fails with
    /// [`SyncError::Closed`].
    pub fn load_older(&self) -> BoxFuture<'static, Result<Vec<Message>, SyncError>> {
        let commands = self.commands.clone();
        async move {
            let (tx, rx) = oneshot::channel();
            commands
                .send(ViewCommand::LoadOlder(tx))
                .await
                .map_err(|_| SyncError::Closed)?;
            rx.await.map_err(|_| SyncError::Closed)?
        }
        .boxed()
    }

    pub async fn refresh(&self) -> Result<(), SyncError> {
        self.commands
            .send(ViewCommand::Refresh)
            .await
            .map_err(|_| SyncError::Closed)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn close(self) {
        let _ = self.commands.send(ViewCommand::Close).await;
        if let Err(e) = self.task.await {
            warn!(chat_id = %self.chat_id, error = %e, "chat view task ended abnormally");
        }
    }
}

/// Start the view actor for `chat_id`.
pub fn spawn_chat_view(
    repo: Arc<dyn ChatRepository>,
    chat_id: ChatId,
    me: Option<UserId>,
    page_size: u32,
    backoff: Backoff,
) -> ChatViewHandle {
    let (commands_tx, commands_rx) = mpsc::channel(16);
    let (snapshot_tx, snapshot_rx) = watch::channel(ChatViewSnapshot::empty(chat_id));

    let actor = ViewActor {
        repo,
        view: MessageListView::new(chat_id, me, page_size),
        commands: commands_rx,
        snapshot: snapshot_tx,
        backoff,
        error: None,
        removed: false,
    };
    let task = tokio::spawn(actor.run());

    ChatViewHandle {
        chat_id,
        commands: commands_tx,
        snapshot: snapshot_rx,
        task,
    }
}

enum Exit {
    Closed,
    Removed,
    Refresh,
    Disconnected(ApiError),
    Unauthorized(ApiError),
}

type PageFetch = BoxFuture<'static, (u32, ApiResult<Vec<Message>>)>;

struct ViewActor {
    repo: Arc<dyn ChatRepository>,
    view: MessageListView,
    commands: mpsc::Receiver<ViewCommand>,
    snapshot: watch::Sender<ChatViewSnapshot>,
    backoff: Backoff,
    error: Option<ApiError>,
    removed: bool,
}

impl ViewActor {
    async fn run(mut self) {
        let chat_id = self.view.chat_id();
        info!(chat_id = %chat_id, "chat view opened");

        // Replies parked while the view is not live survive a resync.
        let mut parked: Vec<Reply> = Vec::new();
        loop {
            self.view.begin_loading();
            self.publish();

            match self.sync_round(&mut parked).await {
                Exit::Closed => break,
                Exit::Removed => {
                    self.removed = true;
                    break;
                }
                Exit::Refresh => self.backoff.reset(),
                Exit::Unauthorized(e) => {
                    warn!(chat_id = %chat_id, error = %e, "chat view stopped: session is not authorized");
                    fail_all(&mut parked, &e);
                    self.error = Some(e);
                    break;
                }
                Exit::Disconnected(e) => {
                    let delay = self.backoff.next_delay();
                    warn!(
                        chat_id = %chat_id,
                        error = %e,
                        attempt = self.backoff.attempt(),
                        delay_ms = delay.as_millis() as u64,
                        "chat view out of sync, retrying"
                    );
                    self.error = Some(e);
                    self.view.invalidate();
                    self.publish();
                    if !self.wait(delay, &mut parked).await {
                        break;
                    }
                }
            }
        }

        self.view.close();
        self.publish();
        info!(chat_id = %chat_id, "chat view closed");
    }

    async fn wait(&mut self, delay: std::time::Duration, parked: &mut Vec<Reply>) -> bool {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return true,
                cmd = self.commands.recv() => match cmd {
                    Some(ViewCommand::LoadOlder(reply)) => parked.push(reply),
                    Some(ViewCommand::Refresh) => {
                        self.backoff.reset();
                        return true;
                    }
                    Some(ViewCommand::Close) | None => return false,
                },
            }
        }
    }

    async fn sync_round(&mut self, parked: &mut Vec<Reply>) -> Exit {
        let chat_id = self.view.chat_id();
        let mut stream = match self.repo.observe_chat(chat_id).await {
            Ok(stream) => stream,
            Err(e) if e.is_unauthorized() => return Exit::Unauthorized(ApiError::unauthorized()),
            Err(e) => return Exit::Disconnected(ApiError::network(e.to_string())),
        };

        let mut first: Option<PageFetch> = Some(self.fetch_page(0));
        let mut older: Option<PageFetch> = None;
        let mut waiting: Vec<Reply> = Vec::new();

        loop {
            tokio::select! {
                // --- First page ---
                Some((_, result)) = OptionFuture::from(first.as_mut()), if first.is_some() => {
                    first = None;
                    let page = match result {
                        Ok(page) => page,
                        Err(e) => return classify(e),
                    };
                    self.backoff.reset();
                    self.error = None;
                    let outcomes = self.view.seed_first_page(page);
                    if outcomes.contains(&Applied::ChatRemoved) {
                        return Exit::Removed;
                    }
                    self.publish();

                    if !parked.is_empty() {
                        waiting.append(parked);
                        older = self.next_older(&mut waiting);
                    }
                }

                // --- Older page ---
                Some((page, result)) = OptionFuture::from(older.as_mut()), if older.is_some() => {
                    older = None;
                    match result {
                        Ok(messages) => {
                            debug!(chat_id = %chat_id, page, count = messages.len(), "older page loaded");
                            self.view.absorb_page(page, messages);
                            self.publish();
                            answer_all(&mut waiting, &self.view);
                        }
                        Err(e) if e.kind == ErrorKind::Unauthorized => {
                            fail_all(&mut waiting, &e);
                            return Exit::Unauthorized(e);
                        }
                        Err(e) => {
                            warn!(chat_id = %chat_id, page, error = %e, "older page failed");
                            fail_all(&mut waiting, &e);
                        }
                    }
                }

                // --- Live events ---
                event = stream.recv() => {
                    let Some(event) = event else {
                        parked.append(&mut waiting);
                        return Exit::Disconnected(ApiError::network("event stream ended"));
                    };
                    debug!(chat_id = %chat_id, event = event.name(), "chat view event");
                    match self.view.apply(event) {
                        Applied::ChatRemoved => return Exit::Removed,
                        Applied::Changed => self.publish(),
                        _ => {}
                    }
                }

                // --- Commands ---
                cmd = self.commands.recv() => match cmd {
                    Some(ViewCommand::LoadOlder(reply)) => {
                        if self.view.phase() != Phase::Live {
                            parked.push(reply);
                        } else {
                            waiting.push(reply);
                            if older.is_none() {
                                older = self.next_older(&mut waiting);
                            }
                        }
                    }
                    Some(ViewCommand::Refresh) => {
                        parked.append(&mut waiting);
                        return Exit::Refresh;
                    }
                    Some(ViewCommand::Close) | None => return Exit::Closed,
                },
            }
        }
    }

    /// Start the next page fetch, or answer from cache when the history is
    /// exhausted.
    fn next_older(&self, waiting: &mut Vec<Reply>) -> Option<PageFetch> {
        match self.view.next_page_request() {
            Some(page) => Some(self.fetch_page(page)),
            None => {
                answer_all(waiting, &self.view);
                None
            }
        }
    }

    fn fetch_page(&self, page: u32) -> PageFetch {
        let repo = Arc::clone(&self.repo);
        let chat_id = self.view.chat_id();
        let page_size = self.view.page_size();
        async move {
            let result = repo.get_messages_for_chat(chat_id, page, page_size).await;
            (page, result)
        }
        .boxed()
    }

    fn publish(&self) {
        let snapshot = ChatViewSnapshot {
            chat_id: self.view.chat_id(),
            phase: self.view.phase(),
            messages: self.view.messages(),
            exhausted: self.view.is_exhausted(),
            removed: self.removed,
            error: self.error.clone(),
        };
        self.snapshot.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

fn answer_all(waiting: &mut Vec<Reply>, view: &MessageListView) {
    if waiting.is_empty() {
        return;
    }
    let messages = view.messages();
    for reply in waiting.drain(..) {
        let _ = reply.send(Ok(messages.clone()));
    }
}

fn fail_all(waiting: &mut Vec<Reply>, error: &ApiError) {
    for reply in waiting.drain(..) {
        let _ = reply.send(Err(SyncError::Api(error.clone())));
    }
}

fn classify(e: ApiError) -> Exit {
    if e.kind == ErrorKind::Unauthorized {
        Exit::Unauthorized(e)
    } else {
        Exit::Disconnected(e)
    }
}
