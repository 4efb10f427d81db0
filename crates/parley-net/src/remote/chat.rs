use async_trait::async_trait;
use tracing::debug;
use url::Url;

use parley_shared::error::{ApiError, ApiResult, ErrorKind};
use parley_shared::models::{Chat, ChatParticipant, Message};
use parley_shared::types::{ChatId, MessageId, UserId};
use parley_shared::validation::validate_chat_name;

use crate::dto::{ChatUpdate, MessageEdit, NewChat, OutgoingMessage, ParticipantIds};
use crate::error::StreamError;
use crate::http::ApiClient;
use crate::repository::ChatRepository;
use crate::socket::{open_event_stream, EventStream};

pub struct RemoteChatRepository {
    api: ApiClient,
    ws_base: Url,
}

impl RemoteChatRepository {
    /// `ws_base` is the WebSocket root, e.g. `wss://chat.example.com/`.
    pub fn new(api: ApiClient, ws_base: Url) -> Self {
        Self { api, ws_base }
    }

    async fn open(&self, path: &str) -> Result<EventStream, StreamError> {
        let token = self
            .api
            .session()
            .token()
            .map_err(|_| StreamError::Unauthorized)?;
        let url = self.ws_base.join(path)?;
        open_event_stream(url, &token).await
    }
}

#[async_trait]
impl ChatRepository for RemoteChatRepository {
    async fn create_chat(&self, chat: NewChat) -> ApiResult<Chat> {
        self.api.session().token()?;
        if let Err(e) = validate_chat_name(chat.name.as_deref(), chat.kind) {
            return Err(ApiError::new(ErrorKind::Validation, format!("chat name {e}")));
        }
        let created: Chat = self.api.post("chats", &chat).await?;
        debug!(chat_id = %created.id, "chat created");
        Ok(created)
    }

    async fn update_chat(
        &self,
        chat_id: ChatId,
        name: String,
        picture_url: Option<String>,
    ) -> ApiResult<Chat> {
        self.api
            .put(&format!("chats/{chat_id}"), &ChatUpdate { name, picture_url })
            .await
    }

    async fn delete_chat(&self, chat_id: ChatId) -> ApiResult<()> {
        self.api.delete(&format!("chats/{chat_id}")).await
    }

    async fn leave_chat(&self, chat_id: ChatId) -> ApiResult<()> {
        self.api
            .post(&format!("chats/{chat_id}/leave"), &())
            .await
    }

    async fn add_participants(
        &self,
        chat_id: ChatId,
        user_ids: Vec<UserId>,
    ) -> ApiResult<Vec<ChatParticipant>> {
        self.api
            .post(
                &format!("chats/{chat_id}/participants"),
                &ParticipantIds { user_ids },
            )
            .await
    }

    async fn remove_participant(&self, chat_id: ChatId, user_id: UserId) -> ApiResult<()> {
        self.api
            .delete(&format!("chats/{chat_id}/participants/{user_id}"))
            .await
    }

    async fn assign_admin_role(&self, chat_id: ChatId, user_id: UserId) -> ApiResult<()> {
        self.api
            .put(&format!("chats/{chat_id}/participants/{user_id}/admin"), &())
            .await
    }

    async fn remove_admin_role(&self, chat_id: ChatId, user_id: UserId) -> ApiResult<()> {
        self.api
            .delete(&format!("chats/{chat_id}/participants/{user_id}/admin"))
            .await
    }

    async fn get_chats(&self) -> ApiResult<Vec<Chat>> {
        self.api.get("chats").await
    }

    async fn get_chat_by_id(&self, chat_id: ChatId) -> ApiResult<Chat> {
        self.api.get(&format!("chats/{chat_id}")).await
    }

    async fn get_dialog_chat_by_user(&self, user_id: UserId) -> ApiResult<Chat> {
        self.api.get(&format!("chats/dialog/{user_id}")).await
    }

    async fn get_messages_for_chat(
        &self,
        chat_id: ChatId,
        page: u32,
        page_size: u32,
    ) -> ApiResult<Vec<Message>> {
        self.api
            .get(&format!("chats/{chat_id}/messages/{page}/{page_size}"))
            .await
    }

    async fn send_message(
        &self,
        chat_id: ChatId,
        text: Option<String>,
        picture_urls: Vec<String>,
    ) -> ApiResult<()> {
        self.api
            .post(
                &format!("chats/{chat_id}/messages"),
                &OutgoingMessage { text, picture_urls },
            )
            .await
    }

    async fn edit_message(&self, message_id: MessageId, text: String) -> ApiResult<()> {
        self.api
            .put(&format!("messages/{message_id}"), &MessageEdit { text })
            .await
    }

    async fn delete_message(&self, message_id: MessageId) -> ApiResult<()> {
        self.api.delete(&format!("messages/{message_id}")).await
    }

    async fn read_message(&self, message_id: MessageId) -> ApiResult<()> {
        self.api
            .post(&format!("messages/{message_id}/read"), &())
            .await
    }

    async fn observe_chats(&self) -> Result<EventStream, StreamError> {
        self.open("ws/chats").await
    }

    async fn observe_chat(&self, chat_id: ChatId) -> Result<EventStream, StreamError> {
        self.open(&format!("ws/chats/{chat_id}")).await
    }
}
