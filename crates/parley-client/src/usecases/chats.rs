//! Chat list, chat management and messaging.

use tokio::sync::watch;
use tracing::debug;

use parley_net::dto::NewChat;
use parley_shared::error::ApiError;
use parley_shared::models::{Chat, ChatKind, ChatParticipant, Message};
use parley_shared::types::{ChatId, MessageId, UserId};
use parley_shared::validation::{
    validate_chat_name, validate_message_content, Field, FormErrors,
};
use parley_sync::{ChatListSnapshot, ChatViewSnapshot};

use crate::client::Client;
use crate::error::Result;

impl Client {
    /// Live chat list. Fails with `Unauthorized` when signed out.
    pub async fn chat_list(&self) -> Result<watch::Receiver<ChatListSnapshot>> {
        let guard = self.sync.lock().await;
        let sync = guard.as_ref().ok_or_else(ApiError::unauthorized)?;
        Ok(sync.watch_chats())
    }

    /// Open a chat view: page 0 plus the chat's live stream.
    pub async fn open_chat(&self, chat_id: ChatId) -> Result<watch::Receiver<ChatViewSnapshot>> {
        let mut guard = self.sync.lock().await;
        let sync = guard.as_mut().ok_or_else(ApiError::unauthorized)?;
        Ok(sync.open_chat(chat_id).await?)
    }

    /// Next older page of an open chat; the full cached list is returned.
    pub async fn load_older_messages(&self, chat_id: ChatId) -> Result<Vec<Message>> {
        let request = {
            let guard = self.sync.lock().await;
            let sync = guard.as_ref().ok_or_else(ApiError::unauthorized)?;
            sync.load_older(chat_id)
        };
        Ok(request.await?)
    }

    pub async fn close_chat(&self, chat_id: ChatId) -> Result<()> {
        let mut guard = self.sync.lock().await;
        if let Some(sync) = guard.as_mut() {
            sync.close_chat(chat_id).await?;
        }
        Ok(())
    }

    /// Drop all local chat state and refetch it.
    pub async fn refresh_chats(&self) -> Result<()> {
        let guard = self.sync.lock().await;
        let sync = guard.as_ref().ok_or_else(ApiError::unauthorized)?;
        Ok(sync.refresh().await?)
    }

    pub async fn create_group_chat(
        &self,
        name: &str,
        participant_ids: Vec<UserId>,
        picture_url: Option<String>,
    ) -> Result<Chat> {
        FormErrors::new()
            .check(
                Field::ChatName,
                validate_chat_name(Some(name), ChatKind::Group),
            )
            .into_result()?;

        let chat = self
            .chats
            .create_chat(NewChat {
                name: Some(name.trim().to_string()),
                participant_ids,
                picture_url,
                kind: ChatKind::Group,
            })
            .await?;
        debug!(chat_id = %chat.id, "group chat created");
        Ok(chat)
    }

    /// The direct chat with `user_id`, created on first use.
    pub async fn open_dialog(&self, user_id: UserId) -> Result<Chat> {
        Ok(self.chats.get_dialog_chat_by_user(user_id).await?)
    }

    pub async fn get_chat(&self, chat_id: ChatId) -> Result<Chat> {
        Ok(self.chats.get_chat_by_id(chat_id).await?)
    }

    pub async fn rename_chat(
        &self,
        chat_id: ChatId,
        name: &str,
        picture_url: Option<String>,
    ) -> Result<Chat> {
        FormErrors::new()
            .check(
                Field::ChatName,
                validate_chat_name(Some(name), ChatKind::Group),
            )
            .into_result()?;

        Ok(self
            .chats
            .update_chat(chat_id, name.trim().to_string(), picture_url)
            .await?)
    }

    pub async fn delete_chat(&self, chat_id: ChatId) -> Result<()> {
        Ok(self.chats.delete_chat(chat_id).await?)
    }

    pub async fn leave_chat(&self, chat_id: ChatId) -> Result<()> {
        self.chats.leave_chat(chat_id).await?;
        self.close_chat(chat_id).await
    }

    pub async fn add_participants(
        &self,
        chat_id: ChatId,
        user_ids: Vec<UserId>,
    ) -> Result<Vec<ChatParticipant>> {
        Ok(self.chats.add_participants(chat_id, user_ids).await?)
    }

    pub async fn remove_participant(&self, chat_id: ChatId, user_id: UserId) -> Result<()> {
        Ok(self.chats.remove_participant(chat_id, user_id).await?)
    }

    pub async fn assign_admin_role(&self, chat_id: ChatId, user_id: UserId) -> Result<()> {
        Ok(self.chats.assign_admin_role(chat_id, user_id).await?)
    }

    pub async fn remove_admin_role(&self, chat_id: ChatId, user_id: UserId) -> Result<()> {
        Ok(self.chats.remove_admin_role(chat_id, user_id).await?)
    }

    /// Send text or pictures. The message itself arrives on the streams.
    pub async fn send_message(
        &self,
        chat_id: ChatId,
        text: Option<&str>,
        picture_urls: Vec<String>,
    ) -> Result<()> {
        FormErrors::new()
            .check(
                Field::MessageText,
                validate_message_content(text, picture_urls.len()),
            )
            .into_result()?;

        let text = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        Ok(self.chats.send_message(chat_id, text, picture_urls).await?)
    }

    pub async fn edit_message(&self, message_id: MessageId, text: &str) -> Result<()> {
        FormErrors::new()
            .check(Field::MessageText, validate_message_content(Some(text), 0))
            .into_result()?;

        Ok(self
            .chats
            .edit_message(message_id, text.trim().to_string())
            .await?)
    }

    pub async fn delete_message(&self, message_id: MessageId) -> Result<()> {
        Ok(self.chats.delete_message(message_id).await?)
    }

    pub async fn mark_read(&self, message_id: MessageId) -> Result<()> {
        Ok(self.chats.read_message(message_id).await?)
    }
}
