//! In-memory repositories and a wired [`Client`] for use-case tests.
//!
//! Every mutating repository call is recorded in a shared log so tests can
//! assert what reached the "server". Reads issued by the background
//! synchroniser (`get_chats`, history pages, subscriptions) are not logged.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use parley_net::dto::{AuthSession, NewChat, ProfileUpdate};
use parley_net::{AuthRepository, ChatRepository, EventStream, StreamError, UserRepository};
use parley_shared::error::{ApiError, ApiResult, ErrorKind};
use parley_shared::models::{
    AuthorSnapshot, Chat, ChatKind, ChatParticipant, Message, MessageKind, ParticipantRole, User,
};
use parley_shared::protocol::ChatEvent;
use parley_shared::types::{ChatId, MessageId, UserId};
use parley_store::{Database, SessionStore};

use crate::client::Client;
use crate::config::ClientConfig;

pub fn user(id: i64, name: &str) -> User {
    User {
        id: UserId(id),
        name: name.to_string(),
        username: None,
        email: None,
        bio: None,
        picture_url: None,
    }
}

fn known_user(id: UserId) -> User {
    match id.0 {
        1 => user(1, "Alice"),
        2 => user(2, "Bob"),
        n => user(n, &format!("user-{n}")),
    }
}

fn member(id: UserId) -> ChatParticipant {
    ChatParticipant {
        user: known_user(id),
        role: ParticipantRole::Member,
    }
}

fn history_message(id: i64, chat_id: ChatId) -> Message {
    Message {
        id: MessageId(id),
        chat_id,
        author_id: UserId(2),
        author: AuthorSnapshot {
            name: "Bob".into(),
            picture_url: None,
        },
        kind: MessageKind::Message,
        text: Some(format!("message {id}")),
        picture_urls: Vec::new(),
        seen_by: BTreeSet::new(),
        created_at: id * 10,
        updated_at: None,
    }
}

type CallLog = Arc<Mutex<Vec<String>>>;

/// Failure injected into the next call of a fake.
#[derive(Default)]
struct Failure(Mutex<Option<ApiError>>);

impl Failure {
    fn set(&self, error: ApiError) {
        *self.0.lock().unwrap() = Some(error);
    }

    fn check(&self) -> ApiResult<()> {
        match self.0.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

pub struct FakeAuth {
    log: CallLog,
    failure: Failure,
}

impl FakeAuth {
    pub fn fail_next(&self, error: ApiError) {
        self.failure.set(error);
    }

    fn call(&self, entry: String) -> ApiResult<()> {
        self.log.lock().unwrap().push(entry);
        self.failure.check()
    }

    fn session() -> AuthSession {
        AuthSession {
            token: "token-1".into(),
            user: user(1, "Alice"),
        }
    }
}

#[async_trait]
impl AuthRepository for FakeAuth {
    async fn login(&self, email: &str, _password: &str) -> ApiResult<AuthSession> {
        self.call(format!("login {email}"))?;
        Ok(Self::session())
    }

    async fn register(&self, _name: &str, email: &str, _password: &str) -> ApiResult<()> {
        self.call(format!("register {email}"))
    }

    async fn verify_email(&self, email: &str, _code: &str) -> ApiResult<AuthSession> {
        self.call(format!("verify_email {email}"))?;
        Ok(Self::session())
    }

    async fn request_password_reset(&self, email: &str) -> ApiResult<()> {
        self.call(format!("request_password_reset {email}"))
    }

    async fn reset_password(&self, email: &str, code: &str, _password: &str) -> ApiResult<()> {
        self.call(format!("reset_password {email} {code}"))
    }

    async fn me(&self) -> ApiResult<User> {
        self.call("me".into())?;
        Ok(user(1, "Alice"))
    }
}

pub struct FakeUsers {
    log: CallLog,
    failure: Failure,
    contacts: Mutex<Vec<UserId>>,
}

impl FakeUsers {
    pub fn fail_next(&self, error: ApiError) {
        self.failure.set(error);
    }

    fn call(&self, entry: String) -> ApiResult<()> {
        self.log.lock().unwrap().push(entry);
        self.failure.check()
    }
}

#[async_trait]
impl UserRepository for FakeUsers {
    async fn get_user(&self, user_id: UserId) -> ApiResult<User> {
        self.call(format!("get_user {user_id}"))?;
        Ok(known_user(user_id))
    }

    async fn search_users(&self, query: &str) -> ApiResult<Vec<User>> {
        self.call(format!("search {query}"))?;
        Ok(vec![user(2, "Bob")])
    }

    async fn get_contacts(&self) -> ApiResult<Vec<User>> {
        self.call("get_contacts".into())?;
        Ok(self
            .contacts
            .lock()
            .unwrap()
            .iter()
            .map(|id| known_user(*id))
            .collect())
    }

    async fn add_contact(&self, user_id: UserId) -> ApiResult<()> {
        self.call(format!("add_contact {user_id}"))?;
        let mut contacts = self.contacts.lock().unwrap();
        if contacts.contains(&user_id) {
            return Err(ApiError::from_kind(ErrorKind::Conflict));
        }
        contacts.push(user_id);
        Ok(())
    }

    async fn remove_contact(&self, user_id: UserId) -> ApiResult<()> {
        self.call(format!("remove_contact {user_id}"))?;
        self.contacts.lock().unwrap().retain(|id| *id != user_id);
        Ok(())
    }

    async fn block_user(&self, user_id: UserId) -> ApiResult<()> {
        self.call(format!("block {user_id}"))
    }

    async fn unblock_user(&self, user_id: UserId) -> ApiResult<()> {
        self.call(format!("unblock {user_id}"))
    }

    async fn update_profile(&self, update: ProfileUpdate) -> ApiResult<User> {
        self.call("update_profile".into())?;
        let mut me = user(1, "Alice");
        if let Some(name) = update.name {
            me.name = name;
        }
        me.username = update.username.or(me.username);
        me.bio = update.bio.or(me.bio);
        me.picture_url = update.picture_url.or(me.picture_url);
        Ok(me)
    }
}

/// Chat server double. Every chat shares one synthetic history, empty by
/// default. Subscriptions stay open until the harness is dropped.
pub struct FakeChats {
    log: CallLog,
    failure: Failure,
    streams: Mutex<Vec<mpsc::Sender<ChatEvent>>>,
    history_len: AtomicUsize,
    /// Held by tests to keep pages past the first in flight.
    pub older_pages: tokio::sync::Mutex<()>,
    older_requests: AtomicUsize,
}

impl FakeChats {
    pub fn fail_next(&self, error: ApiError) {
        self.failure.set(error);
    }

    fn call(&self, entry: String) -> ApiResult<()> {
        self.log.lock().unwrap().push(entry);
        self.failure.check()
    }

    pub fn set_history_len(&self, len: usize) {
        self.history_len.store(len, Ordering::SeqCst);
    }

    pub async fn wait_for_older_request(&self) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.older_requests.load(Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for an older page request");
    }

    fn subscribe(&self) -> EventStream {
        let (tx, stream) = EventStream::channel(16);
        self.streams.lock().unwrap().push(tx);
        stream
    }
}

#[async_trait]
impl ChatRepository for FakeChats {
    async fn create_chat(&self, chat: NewChat) -> ApiResult<Chat> {
        self.call(format!(
            "create_chat {}",
            chat.name.as_deref().unwrap_or_default()
        ))?;
        let mut participants = vec![member(UserId(1))];
        participants.extend(chat.participant_ids.into_iter().map(member));
        if let Some(me) = participants.first_mut() {
            me.role = ParticipantRole::Admin;
        }
        Ok(Chat {
            id: ChatId(100),
            name: chat.name,
            kind: chat.kind,
            picture_url: chat.picture_url,
            last_message: None,
            participants,
            unread_messages_count: 0,
        })
    }

    async fn update_chat(
        &self,
        chat_id: ChatId,
        name: String,
        picture_url: Option<String>,
    ) -> ApiResult<Chat> {
        self.call(format!("update_chat {chat_id} {name}"))?;
        Ok(Chat {
            id: chat_id,
            name: Some(name),
            kind: ChatKind::Group,
            picture_url,
            last_message: None,
            participants: vec![member(UserId(1)), member(UserId(2)), member(UserId(3))],
            unread_messages_count: 0,
        })
    }

    async fn delete_chat(&self, chat_id: ChatId) -> ApiResult<()> {
        self.call(format!("delete_chat {chat_id}"))
    }

    async fn leave_chat(&self, chat_id: ChatId) -> ApiResult<()> {
        self.call(format!("leave_chat {chat_id}"))
    }

    async fn add_participants(
        &self,
        chat_id: ChatId,
        user_ids: Vec<UserId>,
    ) -> ApiResult<Vec<ChatParticipant>> {
        self.call(format!("add_participants {chat_id}"))?;
        Ok(user_ids.into_iter().map(member).collect())
    }

    async fn remove_participant(&self, chat_id: ChatId, user_id: UserId) -> ApiResult<()> {
        self.call(format!("remove_participant {chat_id} {user_id}"))
    }

    async fn assign_admin_role(&self, chat_id: ChatId, user_id: UserId) -> ApiResult<()> {
        self.call(format!("assign_admin {chat_id} {user_id}"))
    }

    async fn remove_admin_role(&self, chat_id: ChatId, user_id: UserId) -> ApiResult<()> {
        self.call(format!("remove_admin {chat_id} {user_id}"))
    }

    async fn get_chats(&self) -> ApiResult<Vec<Chat>> {
        Ok(Vec::new())
    }

    async fn get_chat_by_id(&self, _chat_id: ChatId) -> ApiResult<Chat> {
        Err(ApiError::from_kind(ErrorKind::NotFound))
    }

    async fn get_dialog_chat_by_user(&self, user_id: UserId) -> ApiResult<Chat> {
        self.call(format!("dialog {user_id}"))?;
        Ok(Chat {
            id: ChatId(200 + user_id.0),
            name: None,
            kind: ChatKind::Direct,
            picture_url: None,
            last_message: None,
            participants: vec![member(UserId(1)), member(user_id)],
            unread_messages_count: 0,
        })
    }

    async fn get_messages_for_chat(
        &self,
        chat_id: ChatId,
        page: u32,
        page_size: u32,
    ) -> ApiResult<Vec<Message>> {
        if page > 0 {
            self.older_requests.fetch_add(1, Ordering::SeqCst);
            let _held = self.older_pages.lock().await;
        }
        let len = self.history_len.load(Ordering::SeqCst) as i64;
        let skip = i64::from(page) * i64::from(page_size);
        Ok((1..=len)
            .rev()
            .skip(skip as usize)
            .take(page_size as usize)
            .map(|id| history_message(id, chat_id))
            .collect())
    }

    async fn send_message(
        &self,
        chat_id: ChatId,
        text: Option<String>,
        picture_urls: Vec<String>,
    ) -> ApiResult<()> {
        self.call(format!("send {chat_id} {text:?} {}", picture_urls.len()))
    }

    async fn edit_message(&self, message_id: MessageId, text: String) -> ApiResult<()> {
        self.call(format!("edit {message_id} {text}"))
    }

    async fn delete_message(&self, message_id: MessageId) -> ApiResult<()> {
        self.call(format!("delete_message {message_id}"))
    }

    async fn read_message(&self, message_id: MessageId) -> ApiResult<()> {
        self.call(format!("read {message_id}"))
    }

    async fn observe_chats(&self) -> Result<EventStream, StreamError> {
        Ok(self.subscribe())
    }

    async fn observe_chat(&self, _chat_id: ChatId) -> Result<EventStream, StreamError> {
        Ok(self.subscribe())
    }
}

pub struct Harness {
    pub client: Client,
    pub auth: Arc<FakeAuth>,
    pub users: Arc<FakeUsers>,
    pub chats: Arc<FakeChats>,
    log: CallLog,
}

impl Harness {
    /// Repository calls so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.log.lock().unwrap().clear();
    }
}

/// A signed-out client over in-memory fakes and an in-memory database.
pub fn harness() -> Harness {
    let log: CallLog = Arc::default();
    let auth = Arc::new(FakeAuth {
        log: Arc::clone(&log),
        failure: Failure::default(),
    });
    let users = Arc::new(FakeUsers {
        log: Arc::clone(&log),
        failure: Failure::default(),
        contacts: Mutex::new(Vec::new()),
    });
    let chats = Arc::new(FakeChats {
        log: Arc::clone(&log),
        failure: Failure::default(),
        streams: Mutex::new(Vec::new()),
        history_len: AtomicUsize::new(0),
        older_pages: tokio::sync::Mutex::new(()),
        older_requests: AtomicUsize::new(0),
    });

    let client = Client::new(
        ClientConfig::default(),
        SessionStore::new(),
        Database::open_in_memory(&[7u8; 32]).unwrap(),
        auth.clone(),
        chats.clone(),
        users.clone(),
    );

    Harness {
        client,
        auth,
        users,
        chats,
        log,
    }
}

/// [`harness`] after a successful login, with the call log cleared.
pub async fn signed_in_harness() -> Harness {
    let h = harness();
    h.client
        .login("alice@example.com", "abcdefgh")
        .await
        .unwrap();
    h.clear_calls();
    h
}
