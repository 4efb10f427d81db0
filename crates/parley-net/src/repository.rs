//! Repository contracts.
//!
//! Everything above the network layer depends on these traits, never on the
//! REST/WebSocket implementations directly, so the synchronizer and the
//! use-cases can be driven by in-memory fakes.
//!
//! All calls act on the single authenticated session held by the
//! `SessionStore`; without a token they fail with `ErrorKind::Unauthorized`.

use async_trait::async_trait;

use parley_shared::error::ApiResult;
use parley_shared::models::{Chat, ChatParticipant, Message, User};
use parley_shared::types::{ChatId, MessageId, UserId};

use crate::dto::{AuthSession, NewChat, ProfileUpdate};
use crate::error::StreamError;
use crate::socket::EventStream;

#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Fails with `Validation` when a group chat has a blank name.
    async fn create_chat(&self, chat: NewChat) -> ApiResult<Chat>;

    async fn update_chat(
        &self,
        chat_id: ChatId,
        name: String,
        picture_url: Option<String>,
    ) -> ApiResult<Chat>;

    async fn delete_chat(&self, chat_id: ChatId) -> ApiResult<()>;

    async fn leave_chat(&self, chat_id: ChatId) -> ApiResult<()>;

    /// Repeating a participant call may surface `Conflict`.
    async fn add_participants(
        &self,
        chat_id: ChatId,
        user_ids: Vec<UserId>,
    ) -> ApiResult<Vec<ChatParticipant>>;

    async fn remove_participant(&self, chat_id: ChatId, user_id: UserId) -> ApiResult<()>;

    async fn assign_admin_role(&self, chat_id: ChatId, user_id: UserId) -> ApiResult<()>;

    async fn remove_admin_role(&self, chat_id: ChatId, user_id: UserId) -> ApiResult<()>;

    /// Full list snapshot, authoritative at call time.
    async fn get_chats(&self) -> ApiResult<Vec<Chat>>;

    async fn get_chat_by_id(&self, chat_id: ChatId) -> ApiResult<Chat>;

    /// The direct chat with `user_id`, created server-side when missing.
    async fn get_dialog_chat_by_user(&self, user_id: UserId) -> ApiResult<Chat>;

    /// History page `page` (zero-based). Page 0 holds the newest messages;
    /// each following page is strictly older. Within a page messages are
    /// newest first.
    async fn get_messages_for_chat(
        &self,
        chat_id: ChatId,
        page: u32,
        page_size: u32,
    ) -> ApiResult<Vec<Message>>;

    // Fire-and-observe: the effect arrives later on the event streams.

    async fn send_message(
        &self,
        chat_id: ChatId,
        text: Option<String>,
        picture_urls: Vec<String>,
    ) -> ApiResult<()>;

    async fn edit_message(&self, message_id: MessageId, text: String) -> ApiResult<()>;

    async fn delete_message(&self, message_id: MessageId) -> ApiResult<()>;

    async fn read_message(&self, message_id: MessageId) -> ApiResult<()>;

    /// Global stream of chat events for this session.
    async fn observe_chats(&self) -> Result<EventStream, StreamError>;

    /// Stream scoped to one chat's messages.
    async fn observe_chat(&self, chat_id: ChatId) -> Result<EventStream, StreamError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> ApiResult<AuthSession>;

    /// Creates an inactive account; the server mails a verification code.
    async fn register(&self, name: &str, email: &str, password: &str) -> ApiResult<()>;

    async fn verify_email(&self, email: &str, code: &str) -> ApiResult<AuthSession>;

    async fn request_password_reset(&self, email: &str) -> ApiResult<()>;

    async fn reset_password(&self, email: &str, code: &str, password: &str) -> ApiResult<()>;

    /// The user owning the current token.
    async fn me(&self) -> ApiResult<User>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, user_id: UserId) -> ApiResult<User>;

    async fn search_users(&self, query: &str) -> ApiResult<Vec<User>>;

    async fn get_contacts(&self) -> ApiResult<Vec<User>>;

    async fn add_contact(&self, user_id: UserId) -> ApiResult<()>;

    async fn remove_contact(&self, user_id: UserId) -> ApiResult<()>;

    async fn block_user(&self, user_id: UserId) -> ApiResult<()>;

    async fn unblock_user(&self, user_id: UserId) -> ApiResult<()>;

    async fn update_profile(&self, update: ProfileUpdate) -> ApiResult<User>;
}
