//! # parley-store
//!
//! Local state for the Parley client.
//!
//! Two pieces live here:
//! - [`SessionStore`], the process-wide, observable holder of the bearer
//!   token and the signed-in user snapshot. Every repository reads it.
//! - [`Database`], a SQLite file that survives restarts. It keeps the token
//!   (encrypted with XChaCha20-Poly1305 under a key supplied by the host),
//!   the profile snapshot and the application settings.

pub mod database;
pub mod migrations;
pub mod models;
pub mod profile;
pub mod session;
pub mod tokens;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
pub use session::{Session, SessionStore};
