//! The local SQLite file: session token, profile snapshot and settings.
//!
//! A [`Database`] is always migrated before it is handed out and carries the
//! key the session token is sealed with.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;

use parley_shared::crypto::SymmetricKey;

use crate::error::{Result, StoreError};
use crate::migrations;

const DB_FILE: &str = "parley.db";

pub struct Database {
    conn: Connection,
    key: SymmetricKey,
}

impl Database {
    /// Open `parley.db` in the platform data directory, e.g.
    /// `~/.local/share/parley/` on Linux.
    pub fn new(db_key: &SymmetricKey) -> Result<Self> {
        let path = default_path()?;
        tracing::info!(path = %path.display(), "opening database");
        Self::open_at(&path, db_key)
    }

    pub fn open_at(path: &Path, db_key: &SymmetricKey) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::prepare(conn, db_key)
    }

    pub fn open_in_memory(db_key: &SymmetricKey) -> Result<Self> {
        Self::prepare(Connection::open_in_memory()?, db_key)
    }

    fn prepare(mut conn: Connection, db_key: &SymmetricKey) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run_migrations(&mut conn)?;
        Ok(Self { conn, key: *db_key })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn key(&self) -> &SymmetricKey {
        &self.key
    }

    /// File backing this database; `None` when in memory.
    pub fn path(&self) -> Option<PathBuf> {
        match self.conn.path() {
            Some(p) if !p.is_empty() => Some(PathBuf::from(p)),
            _ => None,
        }
    }
}

fn default_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("com", "parley", "parley").ok_or(StoreError::NoDataDir)?;
    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;
    Ok(data_dir.join(DB_FILE))
}
