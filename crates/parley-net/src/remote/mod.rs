//! REST + WebSocket implementations of the repository traits.
//!
//! | operation                 | method | path                                         |
//! |---------------------------|--------|----------------------------------------------|
//! | get_chats / create_chat   | GET/POST | `chats`                                    |
//! | get/update/delete chat    | GET/PUT/DELETE | `chats/{id}`                         |
//! | leave_chat                | POST   | `chats/{id}/leave`                           |
//! | add_participants          | POST   | `chats/{id}/participants`                    |
//! | remove_participant        | DELETE | `chats/{id}/participants/{user}`             |
//! | assign/remove admin role  | PUT/DELETE | `chats/{id}/participants/{user}/admin`   |
//! | get_dialog_chat_by_user   | GET    | `chats/dialog/{user}`                        |
//! | get_messages_for_chat     | GET    | `chats/{id}/messages/{page}/{pageSize}`      |
//! | send_message              | POST   | `chats/{id}/messages`                        |
//! | edit/delete message       | PUT/DELETE | `messages/{id}`                          |
//! | read_message              | POST   | `messages/{id}/read`                         |
//! | observe_chats             | WS     | `ws/chats`                                   |
//! | observe_chat              | WS     | `ws/chats/{id}`                              |

mod auth;
mod chat;
mod users;

pub use auth::RemoteAuthRepository;
pub use chat::RemoteChatRepository;
pub use users::RemoteUserRepository;
