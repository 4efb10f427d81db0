//! Session-level synchroniser.
//!
//! [`ChatSync`] runs the chat list actor for as long as a user is signed in
//! and opens one view actor per chat on screen. Shutting it down cancels
//! every subscription and in-flight fetch it started.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{self, BoxFuture};
use futures::FutureExt;
use tokio::sync::watch;
use tracing::{debug, info};

use parley_net::ChatRepository;
use parley_shared::constants::DEFAULT_PAGE_SIZE;
use parley_shared::models::Message;
use parley_shared::types::{ChatId, UserId};

use crate::backoff::Backoff;
use crate::chat_actor::{spawn_chat_view, ChatViewHandle, ChatViewSnapshot};
use crate::error::SyncError;
use crate::list_actor::{spawn_chat_list, ChatListHandle, ChatListSnapshot};

/// Paging and reconnect tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub page_size: u32,
    pub reconnect_initial: Duration,
    pub reconnect_max: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            reconnect_initial: Duration::from_millis(500),
            reconnect_max: Duration::from_secs(30),
        }
    }
}

impl SyncConfig {
    fn backoff(&self) -> Backoff {
        Backoff::new(self.reconnect_initial, self.reconnect_max)
    }
}

pub struct ChatSync {
    repo: Arc<dyn ChatRepository>,
    me: Option<UserId>,
    config: SyncConfig,
    list: ChatListHandle,
    views: HashMap<ChatId, ChatViewHandle>,
    open: Option<ChatId>,
}

impl ChatSync {
    /// Start synchronising the chat list for `me`.
    pub fn start(repo: Arc<dyn ChatRepository>, me: Option<UserId>, config: SyncConfig) -> Self {
        info!(user_id = ?me, page_size = config.page_size, "chat sync starting");
        let list = spawn_chat_list(Arc::clone(&repo), me, config.backoff());
        Self {
            repo,
            me,
            config,
            list,
            views: HashMap::new(),
            open: None,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn chats(&self) -> ChatListSnapshot {
        self.list.snapshot()
    }

    pub fn watch_chats(&self) -> watch::Receiver<ChatListSnapshot> {
        self.list.subscribe()
    }

    /// Open (or focus) a chat. Its unread counter resets and it becomes the
    /// chat incoming messages are not counted against.
    pub async fn open_chat(
        &mut self,
        chat_id: ChatId,
    ) -> Result<watch::Receiver<ChatViewSnapshot>, SyncError> {
        self.prune_finished().await;
        let view = self.views.entry(chat_id).or_insert_with(|| {
            debug!(chat_id = %chat_id, "spawning chat view");
            spawn_chat_view(
                Arc::clone(&self.repo),
                chat_id,
                self.me,
                self.config.page_size,
                self.config.backoff(),
            )
        });
        let rx = view.subscribe();
        self.open = Some(chat_id);
        self.list.set_open_chat(Some(chat_id)).await?;
        Ok(rx)
    }

    pub fn chat(&self, chat_id: ChatId) -> Option<ChatViewSnapshot> {
        self.views.get(&chat_id).map(ChatViewHandle::snapshot)
    }

    /// Load the next older page of an open chat. The future is detached
    /// from `self`; see [`ChatViewHandle::load_older`].
    pub fn load_older(
        &self,
        chat_id: ChatId,
    ) -> BoxFuture<'static, Result<Vec<Message>, SyncError>> {
        match self.views.get(&chat_id) {
            Some(view) => view.load_older(),
            None => future::ready(Err(SyncError::Closed)).boxed(),
        }
    }

    /// Close a chat view, dropping its cached messages.
    pub async fn close_chat(&mut self, chat_id: ChatId) -> Result<(), SyncError> {
        if let Some(view) = self.views.remove(&chat_id) {
            view.close().await;
        }
        if self.open == Some(chat_id) {
            self.open = None;
            self.list.set_open_chat(None).await?;
        }
        Ok(())
    }

    /// Force a full resync of the list and every open view.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        self.list.refresh().await?;
        for view in self.views.values() {
            view.refresh().await?;
        }
        Ok(())
    }

    pub fn open_chats(&self) -> Vec<ChatId> {
        self.views.keys().copied().collect()
    }

    pub fn is_running(&self) -> bool {
        !self.list.is_finished()
    }

    /// Stop every actor and release all subscriptions.
    pub async fn shutdown(mut self) {
        for (_, view) in self.views.drain() {
            view.close().await;
        }
        self.list.close().await;
        info!("chat sync stopped");
    }

    /// Forget views whose actor already ended (e.g. the chat was deleted).
    async fn prune_finished(&mut self) {
        let finished: Vec<ChatId> = self
            .views
            .iter()
            .filter(|(_, view)| view.is_finished())
            .map(|(id, _)| *id)
            .collect();
        for chat_id in finished {
            if let Some(view) = self.views.remove(&chat_id) {
                view.close().await;
            }
        }
    }
}
