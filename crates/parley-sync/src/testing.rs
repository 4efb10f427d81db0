//! Fixtures and an in-memory [`ChatRepository`] for reducer and actor tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use parley_net::dto::NewChat;
use parley_net::{ChatRepository, EventStream, StreamError};
use parley_shared::error::{ApiError, ApiResult, ErrorKind};
use parley_shared::models::{
    AuthorSnapshot, Chat, ChatKind, ChatParticipant, Message, MessageKind, ParticipantRole, User,
};
use parley_shared::protocol::ChatEvent;
use parley_shared::types::{ChatId, MessageId, UserId};

pub const ME: UserId = UserId(1);

pub fn participant(id: i64) -> ChatParticipant {
    ChatParticipant {
        user: User {
            id: UserId(id),
            name: format!("user-{id}"),
            username: None,
            email: None,
            bio: None,
            picture_url: None,
        },
        role: ParticipantRole::Member,
    }
}

pub fn chat(id: i64, participants: &[i64]) -> Chat {
    Chat {
        id: ChatId(id),
        name: None,
        kind: if participants.len() == 2 {
            ChatKind::Direct
        } else {
            ChatKind::Group
        },
        picture_url: None,
        last_message: None,
        participants: participants.iter().map(|p| participant(*p)).collect(),
        unread_messages_count: 0,
    }
}

pub fn message(id: i64, chat_id: i64, created_at: i64) -> Message {
    Message {
        id: MessageId(id),
        chat_id: ChatId(chat_id),
        author_id: UserId(2),
        author: AuthorSnapshot {
            name: "user-2".into(),
            picture_url: None,
        },
        kind: MessageKind::Message,
        text: Some(format!("message {id}")),
        picture_urls: Vec::new(),
        seen_by: BTreeSet::new(),
        created_at,
        updated_at: None,
    }
}

pub fn sent(id: i64, chat_id: i64, created_at: i64) -> ChatEvent {
    ChatEvent::MessageSent(message(id, chat_id, created_at))
}

/// Wait until the published snapshot satisfies `pred`.
pub async fn wait_for<T: Clone>(rx: &mut watch::Receiver<T>, pred: impl FnMut(&T) -> bool) -> T {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("timed out waiting for snapshot")
        .expect("actor dropped its snapshot channel")
        .clone()
}

/// Server double: serves chats and history from memory and lets tests push
/// events into every open subscription.
#[derive(Default)]
pub struct FakeChatRepository {
    chats: Mutex<Vec<Chat>>,
    /// Per-chat history, oldest first.
    history: Mutex<HashMap<ChatId, Vec<Message>>>,
    global: Mutex<Vec<mpsc::Sender<ChatEvent>>>,
    scoped: Mutex<HashMap<ChatId, Vec<mpsc::Sender<ChatEvent>>>>,
    /// Held by tests to keep `get_chats` / first pages in flight.
    pub hold: tokio::sync::Mutex<()>,
    /// Held by tests to keep pages past the first in flight.
    pub hold_older: tokio::sync::Mutex<()>,
    pub get_chats_calls: AtomicUsize,
    pub get_chat_calls: AtomicUsize,
    pub page_calls: Mutex<Vec<(ChatId, u32)>>,
    pub observe_calls: AtomicUsize,
    pub unauthorized: AtomicBool,
}

impl FakeChatRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chats(chats: Vec<Chat>) -> Self {
        let fake = Self::new();
        *fake.chats.lock().unwrap() = chats;
        fake
    }

    pub fn set_history(&self, chat_id: ChatId, messages: Vec<Message>) {
        self.history.lock().unwrap().insert(chat_id, messages);
    }

    pub fn replace_chats(&self, chats: Vec<Chat>) {
        *self.chats.lock().unwrap() = chats;
    }

    pub fn add_chat(&self, chat: Chat) {
        self.chats.lock().unwrap().push(chat);
    }

    pub fn global_subscribers(&self) -> usize {
        self.global
            .lock()
            .unwrap()
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }

    pub fn chat_subscribers(&self, chat_id: ChatId) -> usize {
        self.scoped
            .lock()
            .unwrap()
            .get(&chat_id)
            .map(|subs| subs.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }

    pub async fn wait_for_subscribers(&self, count: usize, chat_id: Option<ChatId>) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let current = match chat_id {
                    Some(id) => self.chat_subscribers(id),
                    None => self.global_subscribers(),
                };
                if current >= count {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for subscriber");
    }

    pub async fn wait_for_page_call(&self, chat_id: ChatId, page: u32) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !self.page_calls.lock().unwrap().contains(&(chat_id, page)) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for page request");
    }

    /// Push an event into the global stream(s).
    pub async fn emit(&self, event: ChatEvent) {
        let subs = self.global.lock().unwrap().clone();
        for tx in subs {
            let _ = tx.send(event.clone()).await;
        }
    }

    /// Push an event into every stream scoped to its chat.
    pub async fn emit_scoped(&self, event: ChatEvent) {
        let subs = self
            .scoped
            .lock()
            .unwrap()
            .get(&event.chat_id())
            .cloned()
            .unwrap_or_default();
        for tx in subs {
            let _ = tx.send(event.clone()).await;
        }
    }

    /// End every open subscription, as a dropped connection would.
    pub fn disconnect(&self) {
        self.global.lock().unwrap().clear();
        self.scoped.lock().unwrap().clear();
    }

    fn check_auth(&self) -> ApiResult<()> {
        if self.unauthorized.load(Ordering::SeqCst) {
            Err(ApiError::unauthorized())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChatRepository for FakeChatRepository {
    async fn create_chat(&self, _chat: NewChat) -> ApiResult<Chat> {
        Err(ApiError::from_kind(ErrorKind::Unknown))
    }

    async fn update_chat(
        &self,
        _chat_id: ChatId,
        _name: String,
        _picture_url: Option<String>,
    ) -> ApiResult<Chat> {
        Err(ApiError::from_kind(ErrorKind::Unknown))
    }

    async fn delete_chat(&self, _chat_id: ChatId) -> ApiResult<()> {
        Ok(())
    }

    async fn leave_chat(&self, _chat_id: ChatId) -> ApiResult<()> {
        Ok(())
    }

    async fn add_participants(
        &self,
        _chat_id: ChatId,
        _user_ids: Vec<UserId>,
    ) -> ApiResult<Vec<ChatParticipant>> {
        Ok(Vec::new())
    }

    async fn remove_participant(&self, _chat_id: ChatId, _user_id: UserId) -> ApiResult<()> {
        Ok(())
    }

    async fn assign_admin_role(&self, _chat_id: ChatId, _user_id: UserId) -> ApiResult<()> {
        Ok(())
    }

    async fn remove_admin_role(&self, _chat_id: ChatId, _user_id: UserId) -> ApiResult<()> {
        Ok(())
    }

    async fn get_chats(&self) -> ApiResult<Vec<Chat>> {
        self.get_chats_calls.fetch_add(1, Ordering::SeqCst);
        let _held = self.hold.lock().await;
        self.check_auth()?;
        Ok(self.chats.lock().unwrap().clone())
    }

    async fn get_chat_by_id(&self, chat_id: ChatId) -> ApiResult<Chat> {
        self.get_chat_calls.fetch_add(1, Ordering::SeqCst);
        self.check_auth()?;
        self.chats
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == chat_id)
            .cloned()
            .ok_or_else(|| ApiError::from_kind(ErrorKind::NotFound))
    }

    async fn get_dialog_chat_by_user(&self, _user_id: UserId) -> ApiResult<Chat> {
        Err(ApiError::from_kind(ErrorKind::NotFound))
    }

    async fn get_messages_for_chat(
        &self,
        chat_id: ChatId,
        page: u32,
        page_size: u32,
    ) -> ApiResult<Vec<Message>> {
        self.page_calls.lock().unwrap().push((chat_id, page));
        if page == 0 {
            let _held = self.hold.lock().await;
        } else {
            let _held = self.hold_older.lock().await;
        }
        self.check_auth()?;
        let history = self.history.lock().unwrap();
        let all = history.get(&chat_id).cloned().unwrap_or_default();
        Ok(all
            .into_iter()
            .rev()
            .skip((page * page_size) as usize)
            .take(page_size as usize)
            .collect())
    }

    async fn send_message(
        &self,
        _chat_id: ChatId,
        _text: Option<String>,
        _picture_urls: Vec<String>,
    ) -> ApiResult<()> {
        Ok(())
    }

    async fn edit_message(&self, _message_id: MessageId, _text: String) -> ApiResult<()> {
        Ok(())
    }

    async fn delete_message(&self, _message_id: MessageId) -> ApiResult<()> {
        Ok(())
    }

    async fn read_message(&self, _message_id: MessageId) -> ApiResult<()> {
        Ok(())
    }

    async fn observe_chats(&self) -> Result<EventStream, StreamError> {
        self.observe_calls.fetch_add(1, Ordering::SeqCst);
        if self.unauthorized.load(Ordering::SeqCst) {
            return Err(StreamError::Unauthorized);
        }
        let (tx, stream) = EventStream::channel(64);
        self.global.lock().unwrap().push(tx);
        Ok(stream)
    }

    async fn observe_chat(&self, chat_id: ChatId) -> Result<EventStream, StreamError> {
        if self.unauthorized.load(Ordering::SeqCst) {
            return Err(StreamError::Unauthorized);
        }
        let (tx, stream) = EventStream::channel(64);
        self.scoped
            .lock()
            .unwrap()
            .entry(chat_id)
            .or_default()
            .push(tx);
        Ok(stream)
    }
}
