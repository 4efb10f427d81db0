// Network boundary: the repository contracts and their REST/WebSocket
// implementations.

pub mod dto;
pub mod error;
pub mod http;
pub mod remote;
pub mod repository;
pub mod socket;

pub use error::StreamError;
pub use http::ApiClient;
pub use remote::{RemoteAuthRepository, RemoteChatRepository, RemoteUserRepository};
pub use repository::{AuthRepository, ChatRepository, UserRepository};
pub use socket::EventStream;
