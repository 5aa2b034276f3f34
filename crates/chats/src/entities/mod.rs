//! Domain and wire entities for chat resolution.

pub mod graph;
pub mod participant;

pub use graph::{
    ChatCollection, ConversationMemberBinding, CreateGroupChatRequest, RemoteChat, RemoteMember,
};
pub use participant::ChatParticipant;
