//! Wire types for the Microsoft Graph chat endpoints.

use serde::{Deserialize, Serialize};

pub const AAD_USER_MEMBER_TYPE: &str = "#microsoft.graph.aadUserConversationMember";
pub const GROUP_CHAT_TYPE: &str = "group";
pub const OWNER_ROLE: &str = "owner";

/// Page returned by `GET /me/chats`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCollection {
    pub value: Vec<RemoteChat>,
}

/// A chat as returned by Graph. Only `id` is required; `members` is absent
/// unless the request expanded it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteChat {
    pub id: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub chat_type: Option<String>,
    #[serde(default)]
    pub members: Vec<RemoteMember>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMember {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user: Option<RemoteUserReference>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteUserReference {
    #[serde(default)]
    pub id: Option<String>,
}

impl RemoteMember {
    /// Entra ID object id of the member, from `userId` or a nested `user.id`.
    pub fn object_id(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .or_else(|| self.user.as_ref().and_then(|user| user.id.as_deref()))
            .filter(|id| !id.is_empty())
    }
}

/// Body of `POST /chats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupChatRequest {
    pub chat_type: String,
    pub topic: String,
    pub members: Vec<ConversationMemberBinding>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationMemberBinding {
    #[serde(rename = "@odata.type")]
    pub odata_type: String,
    pub roles: Vec<String>,
    #[serde(rename = "user@odata.bind")]
    pub user_bind: String,
}

impl ConversationMemberBinding {
    /// An owner membership bound to `users('<object id>')` under `graph_base_url`.
    pub fn owner(graph_base_url: &str, object_id: &str) -> Self {
        Self {
            odata_type: AAD_USER_MEMBER_TYPE.to_string(),
            roles: vec![OWNER_ROLE.to_string()],
            user_bind: format!(
                "{}/users('{}')",
                graph_base_url.trim_end_matches('/'),
                object_id
            ),
        }
    }
}
