use thiserror::Error;

use crate::types::{ChatId, MessageId};

/// Result of every operation that crosses the network boundary.
pub type ApiResult<T> = Result<T, ApiError>;

/// Classified failure of a REST call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    #[error("network unreachable")]
    Network,

    #[error("unauthorized")]
    Unauthorized,

    #[error("validation failed")]
    Validation,

    #[error("invalid verification code")]
    InvalidCode,

    #[error("invalid email")]
    InvalidEmail,

    #[error("invalid password")]
    InvalidPassword,

    #[error("account not active")]
    AccountNotActive,

    #[error("user not found")]
    UserNotFound,

    #[error("user already exists")]
    UserAlreadyExists,

    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("forbidden")]
    Forbidden,

    #[error("server error")]
    Server,

    #[error("unknown error")]
    Unknown,
}

impl ErrorKind {
    /// Map a server `exceptionCode` onto a kind.
    pub fn from_exception_code(code: &str) -> Self {
        match code.trim() {
            "400.3" | "400.4" => ErrorKind::InvalidCode,
            "400.5" => ErrorKind::InvalidEmail,
            "400.6" => ErrorKind::InvalidPassword,
            "401" => ErrorKind::Unauthorized,
            "403.1" => ErrorKind::AccountNotActive,
            "404.1" => ErrorKind::UserNotFound,
            "409.1" => ErrorKind::UserAlreadyExists,
            "500" => ErrorKind::Server,
            _ => ErrorKind::Unknown,
        }
    }

    /// Fallback for responses that carry no `exceptionCode`.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Unknown,
        }
    }

    /// Text shown to the user when no server message is available.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::Network => "No connection. Check your network and try again.",
            ErrorKind::Unauthorized => "Your session has expired. Please sign in again.",
            ErrorKind::Validation => "Some fields are not filled in correctly.",
            ErrorKind::InvalidCode => "The code is invalid or has expired.",
            ErrorKind::InvalidEmail => "This email address is not valid.",
            ErrorKind::InvalidPassword => "Wrong password.",
            ErrorKind::AccountNotActive => "This account has not been activated yet.",
            ErrorKind::UserNotFound => "No account exists for this user.",
            ErrorKind::UserAlreadyExists => "An account with this email already exists.",
            ErrorKind::NotFound => "The requested item no longer exists.",
            ErrorKind::Conflict => "This action conflicts with the current state.",
            ErrorKind::Forbidden => "You are not allowed to do this.",
            ErrorKind::Server => "The server is having trouble. Try again later.",
            ErrorKind::Unknown => "Something went wrong.",
        }
    }
}

/// The failed side of the response envelope: a kind plus an optional
/// server-provided message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {}", .message.as_deref().unwrap_or("no details"))]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }

    pub fn from_kind(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    pub fn unauthorized() -> Self {
        Self::from_kind(ErrorKind::Unauthorized)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    /// The server message when present, otherwise the generic text.
    pub fn user_message(&self) -> String {
        match self.message.as_deref() {
            Some(m) if !m.trim().is_empty() => m.to_string(),
            _ => self.kind.user_message().to_string(),
        }
    }
}

/// A model value violates one of its structural invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
    #[error("chat {0} has no participants")]
    NoParticipants(ChatId),

    #[error("direct chat {chat_id} has {participants} participants")]
    DirectChatSize { chat_id: ChatId, participants: usize },

    #[error("message {0} must carry exactly one of text or pictures")]
    MessageContent(MessageId),

    #[error("system message {0} carries pictures")]
    SystemMessageWithPictures(MessageId),
}

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed: invalid ciphertext or wrong key")]
    DecryptionFailed,

    #[error("Invalid key length")]
    InvalidKeyLength,
}
