//! Helpers shared by the resolver and the Graph client.

pub mod matching;
pub mod odata;

pub use matching::{matches_participants, sorted_user_ids};
pub use odata::{escape_literal, group_chat_filter};
