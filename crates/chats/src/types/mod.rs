//! Shared types for the chat resolver.

pub mod errors;

pub use errors::{ChatResolverError, ChatResult};
