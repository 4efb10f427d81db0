use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use parley_shared::models::User;

use crate::database::Database;
use crate::error::Result;
use crate::models::AppSettings;

impl Database {
    pub fn save_profile(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.conn().execute(
            "INSERT INTO profile (id, json, saved_at) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET json = excluded.json, saved_at = excluded.saved_at",
            params![json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn load_profile(&self) -> Result<Option<User>> {
        let json: Option<String> = self
            .conn()
            .query_row("SELECT json FROM profile WHERE id = 1", [], |row| row.get(0))
            .optional()?;
        Ok(json.map(|j| serde_json::from_str(&j)).transpose()?)
    }

    /// Stored settings, or defaults when nothing was saved yet.
    pub fn load_settings(&self) -> Result<AppSettings> {
        let json: Option<String> = self
            .conn()
            .query_row("SELECT json FROM app_settings WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        match json {
            Some(j) => Ok(serde_json::from_str(&j)?),
            None => Ok(AppSettings::default()),
        }
    }

    pub fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        self.conn().execute(
            "INSERT INTO app_settings (id, json) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET json = excluded.json",
            params![json],
        )?;
        Ok(())
    }
}
