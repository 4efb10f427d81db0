//! v001 -- Initial schema creation.
//!
//! Three single-row tables: `session`, `profile` and `app_settings`.

use rusqlite::Connection;

const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Session (bearer token, sealed with XChaCha20-Poly1305)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS session (
    id           INTEGER PRIMARY KEY CHECK (id = 1),
    sealed_token BLOB NOT NULL,               -- nonce || ciphertext
    saved_at     TEXT NOT NULL                -- RFC-3339
);

-- ----------------------------------------------------------------
-- Signed-in user profile snapshot
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS profile (
    id       INTEGER PRIMARY KEY CHECK (id = 1),
    json     TEXT NOT NULL,
    saved_at TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Application settings
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS app_settings (
    id   INTEGER PRIMARY KEY CHECK (id = 1),
    json TEXT NOT NULL
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
