//! # InContact Chats Crate
//!
//! Resolves the Microsoft Teams group chat shared by two users under a given
//! topic, backed by a local mapping table.
//!
//! ## Architecture
//!
//! - **Entities**: participants and Graph wire types
//! - **Services**: the resolver, the on-behalf-of credential, and the Graph client
//! - **Repositories**: the local store seam over `incontact-database`
//! - **Types**: the error taxonomy
//! - **Utils**: OData filter building and participant matching
//!
//! ## Usage
//!
//! ```rust,ignore
//! use incontact_chats::{ChatParticipant, ChatResolver};
//!
//! let resolver = ChatResolver::new(store, credential, graph, scope);
//! let participants = [
//!     ChatParticipant::new(supervisor_id, supervisor_oid),
//!     ChatParticipant::new(agent_id, agent_oid),
//! ];
//! let chat_id = resolver
//!     .get_or_create_chat(bearer, &participants, "InContactApp - Alice & Bob")
//!     .await?;
//! ```

pub mod entities;
pub mod repositories;
pub mod services;
pub mod types;
pub mod utils;

pub use entities::{ChatParticipant, RemoteChat, RemoteMember};
pub use repositories::ChatStore;
pub use services::{
    ChatDirectory, ChatResolver, ChatSource, GraphClient, OnBehalfOfCredential, ResolvedChat,
    TokenExchange,
};
pub use types::{ChatResolverError, ChatResult};

pub use oauth2::AccessToken;
