use serde::{Deserialize, Serialize};

use crate::models::{Chat, ChatParticipant, Message};
use crate::types::{ChatId, MessageId, UserId};

/// State-change notifications delivered on the live event stream.
///
/// Events are notifications, never full snapshots of chat state. Frames on
/// the wire look like `{"type": "MESSAGE_SENT", "payload": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatEvent {
    MessageSent(Message),

    MessageUpdated(Message),

    #[serde(rename_all = "camelCase")]
    MessageDeleted {
        chat_id: ChatId,
        message_id: MessageId,
    },

    ChatCreated(Chat),

    ChatUpdated(Chat),

    #[serde(rename_all = "camelCase")]
    ChatDeleted { chat_id: ChatId },

    /// A participant left voluntarily.
    #[serde(rename_all = "camelCase")]
    LeftChat { chat_id: ChatId, user_id: UserId },

    /// A participant was removed by an admin.
    #[serde(rename_all = "camelCase")]
    DeleteChatParticipant { chat_id: ChatId, user_id: UserId },

    #[serde(rename_all = "camelCase")]
    AddChatParticipants {
        chat_id: ChatId,
        participants: Vec<ChatParticipant>,
    },
}

impl ChatEvent {
    /// The chat this event addresses.
    pub fn chat_id(&self) -> ChatId {
        match self {
            ChatEvent::MessageSent(m) | ChatEvent::MessageUpdated(m) => m.chat_id,
            ChatEvent::ChatCreated(c) | ChatEvent::ChatUpdated(c) => c.id,
            ChatEvent::MessageDeleted { chat_id, .. }
            | ChatEvent::ChatDeleted { chat_id }
            | ChatEvent::LeftChat { chat_id, .. }
            | ChatEvent::DeleteChatParticipant { chat_id, .. }
            | ChatEvent::AddChatParticipants { chat_id, .. } => *chat_id,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ChatEvent::MessageSent(_) => "message_sent",
            ChatEvent::MessageUpdated(_) => "message_updated",
            ChatEvent::MessageDeleted { .. } => "message_deleted",
            ChatEvent::ChatCreated(_) => "chat_created",
            ChatEvent::ChatUpdated(_) => "chat_updated",
            ChatEvent::ChatDeleted { .. } => "chat_deleted",
            ChatEvent::LeftChat { .. } => "left_chat",
            ChatEvent::DeleteChatParticipant { .. } => "delete_chat_participant",
            ChatEvent::AddChatParticipants { .. } => "add_chat_participants",
        }
    }

    /// Serialize to a JSON text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON text frame.
    pub fn from_json(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }
}
