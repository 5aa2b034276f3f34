//! Find-or-create for two-party Teams chats.

use std::fmt;
use std::sync::Arc;

use incontact_database::{CreateChatRecord, DatabaseError};
use tracing::{debug, info, warn};

use crate::entities::ChatParticipant;
use crate::repositories::ChatStore;
use crate::services::{ChatDirectory, TokenExchange};
use crate::types::{ChatResolverError, ChatResult};
use crate::utils::{matches_participants, sorted_user_ids};

/// Where a resolved chat id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatSource {
    LocalStore,
    RemoteSearch,
    RemoteCreate,
}

impl fmt::Display for ChatSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChatSource::LocalStore => "local_store",
            ChatSource::RemoteSearch => "remote_search",
            ChatSource::RemoteCreate => "remote_create",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChat {
    pub chat_id: String,
    pub source: ChatSource,
}

/// Resolves the chat for a (topic, participant pair) by checking the local
/// store, then Graph, then creating it in Graph and recording it locally.
pub struct ChatResolver {
    store: Arc<dyn ChatStore>,
    credentials: Arc<dyn TokenExchange>,
    directory: Arc<dyn ChatDirectory>,
    scope: String,
}

impl ChatResolver {
    pub fn new(
        store: Arc<dyn ChatStore>,
        credentials: Arc<dyn TokenExchange>,
        directory: Arc<dyn ChatDirectory>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            store,
            credentials,
            directory,
            scope: scope.into(),
        }
    }

    /// Return the chat id for `topic` between the two `participants`, creating it if needed.
    ///
    /// `user_assertion` is the caller's raw bearer token, exchanged on-behalf-of
    /// only when the local store has no match.
    pub async fn get_or_create_chat(
        &self,
        user_assertion: &str,
        participants: &[ChatParticipant],
        topic: &str,
    ) -> ChatResult<String> {
        self.resolve(user_assertion, participants, topic)
            .await
            .map(|resolved| resolved.chat_id)
    }

    /// Same as [`Self::get_or_create_chat`] but also reports which step resolved the chat.
    pub async fn resolve(
        &self,
        user_assertion: &str,
        participants: &[ChatParticipant],
        topic: &str,
    ) -> ChatResult<ResolvedChat> {
        let [first, second] = participants else {
            return Err(ChatResolverError::InvalidParticipants {
                count: participants.len(),
            });
        };

        if first.user_id == second.user_id {
            return Err(ChatResolverError::DuplicateParticipant {
                identifier: first.user_id.clone(),
            });
        }
        if first
            .azure_ad_object_id
            .eq_ignore_ascii_case(&second.azure_ad_object_id)
        {
            return Err(ChatResolverError::DuplicateParticipant {
                identifier: first.azure_ad_object_id.clone(),
            });
        }

        let user_ids = sorted_user_ids(first, second);

        if let Some(existing) = self.store.find_chat(topic, &user_ids).await? {
            debug!(chat_id = %existing.id, topic, "chat resolved from local store");
            return Ok(ResolvedChat {
                chat_id: existing.id,
                source: ChatSource::LocalStore,
            });
        }

        let token = self
            .credentials
            .exchange(user_assertion, &self.scope)
            .await?;

        let found = self
            .directory
            .find_group_chats(&token, topic)
            .await?
            .into_iter()
            .find(|chat| matches_participants(chat, first, second));

        let (chat, source) = match found {
            Some(chat) => (chat, ChatSource::RemoteSearch),
            None => {
                let chat = self
                    .directory
                    .create_group_chat(
                        &token,
                        topic,
                        &first.azure_ad_object_id,
                        &second.azure_ad_object_id,
                    )
                    .await?;
                info!(chat_id = %chat.id, topic, "created group chat in graph");
                (chat, ChatSource::RemoteCreate)
            }
        };

        let record = CreateChatRecord::new(chat.id.clone(), topic, user_ids.to_vec());
        match self.store.create_chat(record).await {
            Ok(_) => {}
            Err(DatabaseError::Duplicate(_)) => {
                match self.store.chat_by_id(&chat.id).await? {
                    Some(existing)
                        if existing.topic == topic && existing.member_ids[..] == user_ids[..] =>
                    {
                        debug!(chat_id = %chat.id, "chat mapping already persisted");
                    }
                    existing => {
                        warn!(
                            chat_id = %chat.id,
                            topic,
                            stored_topic = ?existing.as_ref().map(|record| record.topic.as_str()),
                            stored_members = ?existing.as_ref().map(|record| &record.member_ids),
                            "chat mapping already persisted with different topic or members"
                        );
                    }
                }
            }
            Err(error) => return Err(error.into()),
        }

        debug!(chat_id = %chat.id, topic, %source, "chat resolved");
        Ok(ResolvedChat {
            chat_id: chat.id,
            source,
        })
    }
}
