//! Chat participant identities.

use serde::{Deserialize, Serialize};

/// One side of a two-party chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatParticipant {
    /// Identifier in the local user table.
    pub user_id: String,
    /// Entra ID object id used by Graph.
    pub azure_ad_object_id: String,
}

impl ChatParticipant {
    pub fn new(user_id: impl Into<String>, azure_ad_object_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            azure_ad_object_id: azure_ad_object_id.into(),
        }
    }
}
