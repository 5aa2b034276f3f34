//! Microsoft Graph chat directory client.

use std::time::Duration;

use async_trait::async_trait;
use incontact_config::GraphConfig;
use oauth2::AccessToken;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::entities::graph::GROUP_CHAT_TYPE;
use crate::entities::{ChatCollection, ConversationMemberBinding, CreateGroupChatRequest, RemoteChat};
use crate::types::{ChatResolverError, ChatResult};
use crate::utils::group_chat_filter;

/// The remote side of chat resolution: search the caller's group chats and create new ones.
#[async_trait]
pub trait ChatDirectory: Send + Sync {
    /// Group chats visible to the token holder with exactly this topic, members expanded.
    async fn find_group_chats(&self, token: &AccessToken, topic: &str) -> ChatResult<Vec<RemoteChat>>;

    /// Create a group chat with both users as owners.
    async fn create_group_chat(
        &self,
        token: &AccessToken,
        topic: &str,
        first_owner_object_id: &str,
        second_owner_object_id: &str,
    ) -> ChatResult<RemoteChat>;
}

#[derive(Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
}

impl GraphClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &GraphConfig) -> ChatResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent("incontact-integrations")
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        Ok(Self::new(config.base_url.clone(), http))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Payload for `POST /chats`.
    pub fn group_chat_request(
        &self,
        topic: &str,
        first_owner_object_id: &str,
        second_owner_object_id: &str,
    ) -> CreateGroupChatRequest {
        CreateGroupChatRequest {
            chat_type: GROUP_CHAT_TYPE.to_string(),
            topic: topic.to_string(),
            members: vec![
                ConversationMemberBinding::owner(&self.base_url, first_owner_object_id),
                ConversationMemberBinding::owner(&self.base_url, second_owner_object_id),
            ],
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ChatResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ChatResolverError::GraphStatus {
            status: status.as_u16(),
            body,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl ChatDirectory for GraphClient {
    async fn find_group_chats(&self, token: &AccessToken, topic: &str) -> ChatResult<Vec<RemoteChat>> {
        let filter = group_chat_filter(topic);

        let response = self
            .http
            .get(format!("{}/me/chats", self.base_url))
            .bearer_auth(token.secret())
            .query(&[("$filter", filter.as_str()), ("$expand", "members")])
            .send()
            .await?;

        let collection: ChatCollection = read_json(response).await?;
        debug!(topic, count = collection.value.len(), "graph chat search completed");
        Ok(collection.value)
    }

    async fn create_group_chat(
        &self,
        token: &AccessToken,
        topic: &str,
        first_owner_object_id: &str,
        second_owner_object_id: &str,
    ) -> ChatResult<RemoteChat> {
        let payload = self.group_chat_request(topic, first_owner_object_id, second_owner_object_id);

        let response = self
            .http
            .post(format!("{}/chats", self.base_url))
            .bearer_auth(token.secret())
            .json(&payload)
            .send()
            .await?;

        read_json(response).await
    }
}
