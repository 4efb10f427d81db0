use thiserror::Error;

use parley_shared::error::CryptoError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("no platform data directory")]
    NoDataDir,

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("migration failed: {0}")]
    Migration(String),

    /// The token could not be sealed or opened, usually a wrong key.
    #[error("token crypto: {0}")]
    Crypto(#[from] CryptoError),

    #[error("json column: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stored token is not valid UTF-8")]
    CorruptToken,
}

pub type Result<T> = std::result::Result<T, StoreError>;
