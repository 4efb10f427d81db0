//! Chat list actor.
//!
//! One task owns the [`ChatListView`] and is its only writer. It opens the
//! global event stream, fetches the chat list while buffering events,
//! resolves chats it has never seen, and publishes a snapshot after every
//! change. When the stream ends or a fetch fails it backs off and starts
//! over from a full `get_chats`.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::{BoxFuture, OptionFuture};
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use parley_net::{ChatRepository, EventStream};
use parley_shared::error::{ApiError, ApiResult, ErrorKind};
use parley_shared::models::Chat;
use parley_shared::types::{ChatId, UserId};

use crate::backoff::Backoff;
use crate::error::SyncError;
use crate::list_view::ChatListView;
use crate::{Applied, Phase};

/// What subscribers of the chat list see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatListSnapshot {
    pub phase: Phase,
    /// Most recent activity first.
    pub chats: Vec<Chat>,
    pub open_chat: Option<ChatId>,
    /// Last failure that forced a resync, cleared once live again.
    pub error: Option<ApiError>,
}

impl ChatListSnapshot {
    pub fn chat(&self, chat_id: ChatId) -> Option<&Chat> {
        self.chats.iter().find(|c| c.id == chat_id)
    }

    pub fn total_unread(&self) -> u32 {
        self.chats.iter().map(|c| c.unread_messages_count).sum()
    }
}

#[derive(Debug)]
enum ListCommand {
    SetOpenChat(Option<ChatId>),
    Refresh,
    Close,
}

/// Control handle for a running chat list actor.
#[derive(Debug)]
pub struct ChatListHandle {
    commands: mpsc::Sender<ListCommand>,
    snapshot: watch::Receiver<ChatListSnapshot>,
    task: JoinHandle<()>,
}

impl ChatListHandle {
    pub fn snapshot(&self) -> ChatListSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatListSnapshot> {
        self.snapshot.clone()
    }

    /// Tell the list which chat is on screen; its unread counter resets.
    pub async fn set_open_chat(&self, chat_id: Option<ChatId>) -> Result<(), SyncError> {
        self.send(ListCommand::SetOpenChat(chat_id)).await
    }

    /// Drop the stream and resynchronise from scratch.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        self.send(ListCommand::Refresh).await
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the actor and wait for it to release the stream.
    pub async fn close(self) {
        let _ = self.commands.send(ListCommand::Close).await;
        if let Err(e) = self.task.await {
            warn!(error = %e, "chat list task ended abnormally");
        }
    }

    async fn send(&self, command: ListCommand) -> Result<(), SyncError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SyncError::Closed)
    }
}

/// Start the chat list actor for the signed-in user `me`.
pub fn spawn_chat_list(
    repo: Arc<dyn ChatRepository>,
    me: Option<UserId>,
    backoff: Backoff,
) -> ChatListHandle {
    let (commands_tx, commands_rx) = mpsc::channel(32);
    let (snapshot_tx, snapshot_rx) = watch::channel(ChatListSnapshot::default());

    let actor = ListActor {
        repo,
        view: ChatListView::new(me),
        commands: commands_rx,
        snapshot: snapshot_tx,
        backoff,
        error: None,
    };
    let task = tokio::spawn(actor.run());

    ChatListHandle {
        commands: commands_tx,
        snapshot: snapshot_rx,
        task,
    }
}

/// Why one synchronisation round ended.
enum Exit {
    Closed,
    Refresh,
    Disconnected(ApiError),
    Unauthorized(ApiError),
}

type Lookup = BoxFuture<'static, (ChatId, ApiResult<Chat>)>;

struct ListActor {
    repo: Arc<dyn ChatRepository>,
    view: ChatListView,
    commands: mpsc::Receiver<ListCommand>,
    snapshot: watch::Sender<ChatListSnapshot>,
    backoff: Backoff,
    error: Option<ApiError>,
}

impl ListActor {
    async fn run(mut self) {
        info!("chat list sync started");
        loop {
            self.view.begin_loading();
            self.publish();

            match self.sync_round().await {
                Exit::Closed => break,
                Exit::Refresh => {
                    self.backoff.reset();
                    debug!("chat list refresh requested");
                }
                Exit::Unauthorized(e) => {
                    warn!(error = %e, "chat list sync stopped: session is not authorized");
                    self.error = Some(e);
                    break;
                }
                Exit::Disconnected(e) => {
                    let delay = self.backoff.next_delay();
                    warn!(
                        error = %e,
                        attempt = self.backoff.attempt(),
                        delay_ms = delay.as_millis() as u64,
                        "chat list out of sync, retrying"
                    );
                    self.error = Some(e);
                    self.view.invalidate();
                    self.publish();
                    if !self.wait(delay).await {
                        break;
                    }
                }
            }
        }

        self.view.close();
        self.publish();
        info!("chat list sync stopped");
    }

    /// Sleep before a retry while still serving commands. Returns `false`
    /// when the actor should stop.
    async fn wait(&mut self, delay: std::time::Duration) -> bool {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return true,
                cmd = self.commands.recv() => match cmd {
                    Some(ListCommand::SetOpenChat(chat_id)) => {
                        if self.view.set_open_chat(chat_id) {
                            self.publish();
                        }
                    }
                    Some(ListCommand::Refresh) => {
                        self.backoff.reset();
                        return true;
                    }
                    Some(ListCommand::Close) | None => return false,
                },
            }
        }
    }

    async fn sync_round(&mut self) -> Exit {
        let mut stream: EventStream = match self.repo.observe_chats().await {
            Ok(stream) => stream,
            Err(e) if e.is_unauthorized() => return Exit::Unauthorized(ApiError::unauthorized()),
            Err(e) => return Exit::Disconnected(ApiError::network(e.to_string())),
        };

        let repo = Arc::clone(&self.repo);
        let mut fetch: Option<BoxFuture<'static, ApiResult<Vec<Chat>>>> =
            Some(async move { repo.get_chats().await }.boxed());
        let mut lookups: FuturesUnordered<Lookup> = FuturesUnordered::new();
        let mut resolving: HashSet<ChatId> = HashSet::new();

        loop {
            tokio::select! {
                // --- Initial snapshot ---
                Some(result) = OptionFuture::from(fetch.as_mut()), if fetch.is_some() => {
                    fetch = None;
                    match result {
                        Ok(chats) => {
                            self.backoff.reset();
                            self.error = None;
                            let outcomes = self.view.seed(chats);
                            for outcome in outcomes {
                                self.resolve(outcome, &mut lookups, &mut resolving);
                            }
                            self.publish();
                        }
                        Err(e) => return classify(e),
                    }
                }

                // --- Live events ---
                event = stream.recv() => {
                    let Some(event) = event else {
                        return Exit::Disconnected(ApiError::network("event stream ended"));
                    };
                    debug!(event = event.name(), chat_id = %event.chat_id(), "chat event");
                    match self.view.apply(event) {
                        Applied::Changed | Applied::ChatRemoved => self.publish(),
                        outcome @ Applied::StaleChat(_) => {
                            self.publish();
                            self.resolve(outcome, &mut lookups, &mut resolving);
                        }
                        outcome => self.resolve(outcome, &mut lookups, &mut resolving),
                    }
                }

                // --- Unknown and stale chats ---
                Some((chat_id, result)) = lookups.next(), if !lookups.is_empty() => {
                    resolving.remove(&chat_id);
                    match result {
                        Ok(chat) => {
                            self.view.upsert_chat(chat);
                            self.publish();
                        }
                        Err(e) if e.kind == ErrorKind::Unauthorized => {
                            return Exit::Unauthorized(e);
                        }
                        Err(e) => {
                            let dropped = self.view.forget_orphans(chat_id);
                            debug!(chat_id = %chat_id, dropped, error = %e, "unresolved chat");
                        }
                    }
                }

                // --- Commands ---
                cmd = self.commands.recv() => match cmd {
                    Some(ListCommand::SetOpenChat(chat_id)) => {
                        if self.view.set_open_chat(chat_id) {
                            self.publish();
                        }
                    }
                    Some(ListCommand::Refresh) => return Exit::Refresh,
                    Some(ListCommand::Close) | None => return Exit::Closed,
                },
            }
        }
    }

    /// Fetch a chat the list has not seen, or whose last message is gone,
    /// once per chat.
    fn resolve(
        &self,
        outcome: Applied,
        lookups: &mut FuturesUnordered<Lookup>,
        resolving: &mut HashSet<ChatId>,
    ) {
        let chat_id = match outcome {
            Applied::UnknownChat(chat_id) | Applied::StaleChat(chat_id) => chat_id,
            _ => return,
        };
        if !resolving.insert(chat_id) {
            return;
        }
        debug!(chat_id = %chat_id, "refetching chat");
        let repo = Arc::clone(&self.repo);
        lookups.push(async move { (chat_id, repo.get_chat_by_id(chat_id).await) }.boxed());
    }

    fn publish(&self) {
        let snapshot = ChatListSnapshot {
            phase: self.view.phase(),
            chats: self.view.chats(),
            open_chat: self.view.open_chat(),
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

fn classify(e: ApiError) -> Exit {
    if e.kind == ErrorKind::Unauthorized {
        Exit::Unauthorized(e)
    } else {
        Exit::Disconnected(e)
    }
}
