use thiserror::Error;

use parley_shared::error::{ApiError, ErrorKind};
use parley_shared::validation::FormErrors;
use parley_store::StoreError;
use parley_sync::SyncError;

/// Failure of a client use-case.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected before any network call; one entry per bad field.
    #[error("invalid input: {0}")]
    Invalid(#[from] FormErrors),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("local storage error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("local database is unavailable")]
    DatabaseUnavailable,
}

impl ClientError {
    /// Kind of the remote failure, if this came from the server or network.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ClientError::Api(e) | ClientError::Sync(SyncError::Api(e)) => Some(e.kind),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == Some(ErrorKind::Unauthorized)
    }

    pub fn form_errors(&self) -> Option<&FormErrors> {
        match self {
            ClientError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }

    /// Text suitable for a banner or toast.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api(e) | ClientError::Sync(SyncError::Api(e)) => e.user_message(),
            ClientError::Invalid(_) => "Please check the highlighted fields".to_string(),
            ClientError::Sync(SyncError::Closed) => "This chat is no longer open".to_string(),
            ClientError::Store(_) | ClientError::DatabaseUnavailable => {
                "Local storage is unavailable".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
