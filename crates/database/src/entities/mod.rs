//! Persisted entity definitions

pub mod chat;

pub use chat::{ChatRecord, CreateChatRecord};
