//! # parley-shared
//!
//! Types shared by every Parley crate: identifiers, the chat data model,
//! the live `ChatEvent` union, the REST response envelope, the error
//! taxonomy and the input validation rules.

pub mod constants;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod models;
pub mod protocol;
pub mod types;
pub mod validation;

pub use envelope::Envelope;
pub use error::{ApiError, ApiResult, ErrorKind};
pub use models::*;
pub use protocol::ChatEvent;
pub use types::{ChatId, MessageId, UserId};
