//! Chat domain model as exchanged with the server.
//!
//! Every struct derives `Serialize` and `Deserialize` with camelCase field
//! names so it maps one-to-one onto the REST and event-stream payloads.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::InvariantError;
use crate::types::{ChatId, MessageId, UserId};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Public profile of a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// Human-readable display name.
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    /// Only present for the signed-in user and contacts.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub picture_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatKind {
    /// One-to-one conversation, always exactly two participants.
    Direct,
    Group,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantRole {
    #[default]
    Member,
    Admin,
}

/// A user's membership in a chat. Identity is the user id; the role may
/// change in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatParticipant {
    pub user: User,
    #[serde(default)]
    pub role: ParticipantRole,
}

impl ChatParticipant {
    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.role == ParticipantRole::Admin
    }
}

/// A conversation (direct or group).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,
    /// Explicit name; unnamed chats derive one from their participants.
    #[serde(default)]
    pub name: Option<String>,
    pub kind: ChatKind,
    #[serde(default)]
    pub picture_url: Option<String>,
    #[serde(default)]
    pub last_message: Option<Message>,
    pub participants: Vec<ChatParticipant>,
    #[serde(default)]
    pub unread_messages_count: u32,
}

impl Chat {
    /// Name shown in chat lists: the explicit name when set, otherwise the
    /// names of every participant except `me`.
    pub fn display_name(&self, me: Option<UserId>) -> String {
        if let Some(name) = self.name.as_deref().map(str::trim) {
            if !name.is_empty() {
                return name.to_string();
            }
        }

        let others: Vec<&str> = self
            .participants
            .iter()
            .filter(|p| Some(p.user.id) != me)
            .map(|p| p.user.name.as_str())
            .collect();

        if others.is_empty() {
            self.participants
                .first()
                .map(|p| p.user.name.clone())
                .unwrap_or_default()
        } else {
            others.join(", ")
        }
    }

    pub fn participant(&self, user_id: UserId) -> Option<&ChatParticipant> {
        self.participants.iter().find(|p| p.user.id == user_id)
    }

    /// Insert new participants or replace existing ones (matched by user id).
    /// Returns `true` if the list changed.
    pub fn upsert_participants(&mut self, incoming: &[ChatParticipant]) -> bool {
        let mut changed = false;
        for participant in incoming {
            match self
                .participants
                .iter_mut()
                .find(|p| p.user.id == participant.user.id)
            {
                Some(existing) if existing != participant => {
                    *existing = participant.clone();
                    changed = true;
                }
                Some(_) => {}
                None => {
                    self.participants.push(participant.clone());
                    changed = true;
                }
            }
        }
        changed
    }

    /// Remove a participant by user id. Returns `true` if one was removed.
    pub fn remove_participant(&mut self, user_id: UserId) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.user.id != user_id);
        self.participants.len() != before
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.participants.is_empty() {
            return Err(InvariantError::NoParticipants(self.id));
        }
        if self.kind == ChatKind::Direct && self.participants.len() != 2 {
            return Err(InvariantError::DirectChatSize {
                chat_id: self.id,
                participants: self.participants.len(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    /// Regular user content.
    Message,
    ChatCreated,
    NameChanged,
    PictureChanged,
    ParticipantInvited,
    ParticipantLeft,
    ParticipantKicked,
    AdminRoleAssigned,
    AdminRoleRemoved,
}

impl MessageKind {
    /// System notices are generated by the server, never typed by a user.
    pub fn is_system(self) -> bool {
        self != MessageKind::Message
    }
}

/// Author name and picture as they were when the message was sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSnapshot {
    pub name: String,
    #[serde(default)]
    pub picture_url: Option<String>,
}

/// A single chat message or system notice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub author_id: UserId,
    pub author: AuthorSnapshot,
    pub kind: MessageKind,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub picture_urls: Vec<String>,
    #[serde(default)]
    pub seen_by: BTreeSet<UserId>,
    /// Epoch seconds, UTC.
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

impl Message {
    /// Total order of messages within a chat.
    pub fn order_key(&self) -> (i64, MessageId) {
        (self.created_at, self.id)
    }

    pub fn is_newer_than(&self, other: &Message) -> bool {
        self.order_key() > other.order_key()
    }

    /// Read as soon as anyone other than the author has seen it.
    pub fn is_read(&self) -> bool {
        self.seen_by.iter().any(|id| *id != self.author_id)
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let has_text = self.text.as_deref().is_some_and(|t| !t.trim().is_empty());
        let has_pictures = !self.picture_urls.is_empty();

        if self.kind.is_system() {
            if has_pictures {
                return Err(InvariantError::SystemMessageWithPictures(self.id));
            }
        } else if has_text == has_pictures {
            return Err(InvariantError::MessageContent(self.id));
        }
        Ok(())
    }
}
