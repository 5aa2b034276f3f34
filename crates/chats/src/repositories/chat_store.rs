//! Local store seam for resolved chats.

use async_trait::async_trait;
use incontact_database::{ChatRecord, ChatRepository, CreateChatRecord, DatabaseResult};

/// Persistence the resolver needs: an exact-pair lookup, a lookup by chat id
/// and a single insert.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Chat with exactly this topic whose members are exactly `user_ids`.
    async fn find_chat(&self, topic: &str, user_ids: &[String; 2])
        -> DatabaseResult<Option<ChatRecord>>;

    async fn chat_by_id(&self, chat_id: &str) -> DatabaseResult<Option<ChatRecord>>;

    async fn create_chat(&self, record: CreateChatRecord) -> DatabaseResult<ChatRecord>;
}

#[async_trait]
impl ChatStore for ChatRepository {
    async fn find_chat(
        &self,
        topic: &str,
        user_ids: &[String; 2],
    ) -> DatabaseResult<Option<ChatRecord>> {
        self.find_by_topic_and_members(topic, &user_ids[0], &user_ids[1])
            .await
    }

    async fn chat_by_id(&self, chat_id: &str) -> DatabaseResult<Option<ChatRecord>> {
        self.find_by_id(chat_id).await
    }

    async fn create_chat(&self, record: CreateChatRecord) -> DatabaseResult<ChatRecord> {
        self.create(&record).await
    }
}
