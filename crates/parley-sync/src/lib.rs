//! # parley-sync
//!
//! Keeps an in-memory chat list and per-chat message lists consistent with
//! the server by merging three asynchronous sources: paginated history
//! fetches, the global chat event stream, and the per-chat event stream.
//!
//! ## Layers
//!
//! - [`Timeline`]: ordered, deduplicated message set for one chat.
//! - [`ChatListView`] / [`MessageListView`]: pure reducers. They own the
//!   `Unopened -> Loading -> Live -> Closed` phase machine, buffer events
//!   while loading and replay them after seeding.
//! - [`spawn_chat_list`] / [`spawn_chat_view`]: actor tasks that own one
//!   reducer each, so every write to a chat is serialised through a single
//!   task. They fetch, subscribe, reconnect and publish snapshots over
//!   `watch` channels.
//! - [`ChatSync`]: the facade a front-end holds for a signed-in session.

pub mod backoff;
pub mod chat_actor;
pub mod error;
pub mod list_actor;
pub mod list_view;
pub mod message_view;
pub mod service;
pub mod timeline;

#[cfg(test)]
mod testing;

pub use backoff::Backoff;
pub use chat_actor::{spawn_chat_view, ChatViewHandle, ChatViewSnapshot};
pub use error::SyncError;
pub use list_actor::{spawn_chat_list, ChatListHandle, ChatListSnapshot};
pub use list_view::ChatListView;
pub use message_view::MessageListView;
pub use service::{ChatSync, SyncConfig};
pub use timeline::Timeline;

/// Lifecycle of a synchronised view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Unopened,
    /// Initial fetch in flight; stream events are buffered.
    Loading,
    /// Seeded; stream events apply immediately.
    Live,
    /// Released; buffers and cached messages are gone.
    Closed,
}

/// What a reducer did with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Held until the initial fetch completes.
    Buffered,
    Changed,
    /// Duplicate, stale, or not addressed to this view.
    Unchanged,
    /// The event names a chat the list has never seen.
    UnknownChat(parley_shared::types::ChatId),
    /// The chat's last message was deleted and nothing older is cached;
    /// the chat must be refetched.
    StaleChat(parley_shared::types::ChatId),
    /// The view's chat is gone (deleted, or the user left it).
    ChatRemoved,
}
