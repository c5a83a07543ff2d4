//! Persistent conversation history

use uuid::Uuid;

use super::Database;
use crate::models::ChatMessageRecord;
use crate::Result;

impl Database {
    /// Append one message to a conversation
    pub async fn save_chat_message(
        &self,
        user_id: Uuid,
        session_id: &str,
        role: &str,
        content: &str,
    ) -> Result<ChatMessageRecord> {
        let record = sqlx::query_as::<_, ChatMessageRecord>(
            r"
            INSERT INTO chat_messages (user_id, session_id, role, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, session_id, role, content, created_at
            ",
        )
        .bind(user_id)
        .bind(session_id)
        .bind(role)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Fetch the most recent messages of a conversation, oldest first
    pub async fn recent_history(
        &self,
        user_id: Uuid,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatMessageRecord>> {
        // Take the newest `limit` rows, then flip them back into
        // chronological order for prompt replay
        let records = sqlx::query_as::<_, ChatMessageRecord>(
            r"
            SELECT id, user_id, session_id, role, content, created_at
            FROM (
                SELECT id, user_id, session_id, role, content, created_at
                FROM chat_messages
                WHERE user_id = $1 AND session_id = $2
                ORDER BY created_at DESC
                LIMIT $3
            ) recent
            ORDER BY created_at ASC
            ",
        )
        .bind(user_id)
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
