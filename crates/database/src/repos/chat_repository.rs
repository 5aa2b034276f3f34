//! Repository for chat data access operations.

use crate::entities::{ChatRecord, CreateChatRecord};
use crate::types::{DatabaseError, DatabaseResult};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

/// Repository for chat database operations
#[derive(Clone)]
pub struct ChatRepository {
    pool: SqlitePool,
}

impl ChatRepository {
    /// Create a new chat repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find the oldest chat with this topic whose members are exactly the two given users.
    ///
    /// The pair is unordered.
    pub async fn find_by_topic_and_members(
        &self,
        topic: &str,
        first_user_id: &str,
        second_user_id: &str,
    ) -> DatabaseResult<Option<ChatRecord>> {
        let mut pair = [first_user_id, second_user_id];
        pair.sort_unstable();

        let row = sqlx::query(
            r#"
            SELECT c.id, c.topic, c.created_at
            FROM chats c
            WHERE c.topic = ?
            AND EXISTS (SELECT 1 FROM chat_members m WHERE m.chat_id = c.id AND m.user_id = ?)
            AND EXISTS (SELECT 1 FROM chat_members m WHERE m.chat_id = c.id AND m.user_id = ?)
            AND NOT EXISTS (
                SELECT 1 FROM chat_members m
                WHERE m.chat_id = c.id AND m.user_id NOT IN (?, ?)
            )
            ORDER BY c.created_at ASC, c.id ASC
            LIMIT 1
            "#,
        )
        .bind(topic)
        .bind(pair[0])
        .bind(pair[1])
        .bind(pair[0])
        .bind(pair[1])
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        let Some(row) = row else {
            debug!(topic, "no local chat for participant pair");
            return Ok(None);
        };

        let id: String = row
            .try_get("id")
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        let member_ids = self.member_ids(&id).await?;

        Ok(Some(ChatRecord {
            id,
            topic: row
                .try_get("topic")
                .map_err(|e| DatabaseError::QueryError(e.to_string()))?,
            member_ids,
            created_at: row
                .try_get("created_at")
                .map_err(|e| DatabaseError::QueryError(e.to_string()))?,
        }))
    }

    /// Find chat by its identifier
    pub async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<ChatRecord>> {
        let row = sqlx::query("SELECT id, topic, created_at FROM chats WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(ChatRecord {
            id: id.to_string(),
            topic: row
                .try_get("topic")
                .map_err(|e| DatabaseError::QueryError(e.to_string()))?,
            member_ids: self.member_ids(id).await?,
            created_at: row
                .try_get("created_at")
                .map_err(|e| DatabaseError::QueryError(e.to_string()))?,
        }))
    }

    /// Insert a chat and its members in one transaction.
    ///
    /// Returns [`DatabaseError::Duplicate`] when a chat with the same id already exists.
    pub async fn create(&self, request: &CreateChatRecord) -> DatabaseResult<ChatRecord> {
        let mut member_ids = request.member_ids.clone();
        member_ids.sort();
        member_ids.dedup();

        if member_ids.len() != 2 || member_ids.len() != request.member_ids.len() {
            return Err(DatabaseError::ValidationError(
                "a chat needs exactly two distinct members".to_string(),
            ));
        }

        let now = chrono::Utc::now().to_rfc3339();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        sqlx::query("INSERT INTO chats (id, topic, created_at) VALUES (?, ?, ?)")
            .bind(&request.id)
            .bind(&request.topic)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::from_sqlx(e, &format!("chat {}", request.id)))?;

        for user_id in &member_ids {
            sqlx::query("INSERT INTO chat_members (chat_id, user_id) VALUES (?, ?)")
                .bind(&request.id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| DatabaseError::from_sqlx(e, &format!("member {user_id}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        info!(chat_id = %request.id, topic = %request.topic, "persisted chat mapping");

        Ok(ChatRecord {
            id: request.id.clone(),
            topic: request.topic.clone(),
            member_ids,
            created_at: now,
        })
    }

    /// Count persisted chats
    pub async fn count(&self) -> DatabaseResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM chats")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        row.try_get("count")
            .map_err(|e| DatabaseError::QueryError(e.to_string()))
    }

    async fn member_ids(&self, chat_id: &str) -> DatabaseResult<Vec<String>> {
        let rows = sqlx::query("SELECT user_id FROM chat_members WHERE chat_id = ? ORDER BY user_id")
            .bind(chat_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                row.try_get("user_id")
                    .map_err(|e| DatabaseError::QueryError(e.to_string()))
            })
            .collect()
    }
}
