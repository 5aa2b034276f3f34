//! Chat resolution services and their remote collaborators.

pub mod chat_resolver;
pub mod credential;
pub mod graph_client;

pub use chat_resolver::{ChatResolver, ChatSource, ResolvedChat};
pub use credential::{OnBehalfOfCredential, TokenExchange};
pub use graph_client::{ChatDirectory, GraphClient};
