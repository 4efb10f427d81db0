//! Use-cases grouped by screen area. Each file adds an `impl Client` block.

pub mod auth;
pub mod chats;
pub mod contacts;
pub mod profile;
pub mod settings;
