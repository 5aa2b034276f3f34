//! Data access for chat resolution.

pub mod chat_store;

pub use chat_store::ChatStore;
