//! Chat entity definitions

use serde::{Deserialize, Serialize};

/// A locally persisted mapping from a Teams chat to its two participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRecord {
    /// Same value as the Graph chat id.
    pub id: String,
    pub topic: String,
    /// Sorted local user identifiers.
    pub member_ids: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChatRecord {
    pub id: String,
    pub topic: String,
    pub member_ids: Vec<String>,
}

impl CreateChatRecord {
    pub fn new(id: impl Into<String>, topic: impl Into<String>, member_ids: Vec<String>) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            member_ids,
        }
    }
}
