use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use parley_shared::crypto;

use crate::database::Database;
use crate::error::{Result, StoreError};

const TOKEN_LABEL: &[u8] = b"session.sealed_token";

impl Database {
    /// Seal and persist the bearer token, replacing any previous one.
    pub fn save_token(&self, token: &str) -> Result<()> {
        let sealed = crypto::encrypt(self.key(), TOKEN_LABEL, token.as_bytes())?;
        self.conn().execute(
            "INSERT INTO session (id, sealed_token, saved_at) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET sealed_token = excluded.sealed_token,
                                           saved_at = excluded.saved_at",
            params![sealed, Utc::now().to_rfc3339()],
        )?;
        tracing::debug!("session token saved");
        Ok(())
    }

    /// Load and open the persisted token, if any.
    pub fn load_token(&self) -> Result<Option<String>> {
        let sealed: Option<Vec<u8>> = self
            .conn()
            .query_row("SELECT sealed_token FROM session WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        match sealed {
            Some(bytes) => {
                let plain = crypto::decrypt(self.key(), TOKEN_LABEL, &bytes)?;
                String::from_utf8(plain)
                    .map(Some)
                    .map_err(|_| StoreError::CorruptToken)
            }
            None => Ok(None),
        }
    }

    /// Forget the token and the profile snapshot.
    pub fn clear_session(&self) -> Result<()> {
        self.conn().execute("DELETE FROM session", [])?;
        self.conn().execute("DELETE FROM profile", [])?;
        tracing::debug!("persisted session cleared");
        Ok(())
    }
}
