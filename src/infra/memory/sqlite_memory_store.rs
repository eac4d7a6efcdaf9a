use crate::core::memory::{MemoryError, MemoryRole, MemoryStore, MemoryTurn};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteMemoryStore {
    pool: Pool<Sqlite>,
}

impl SqliteMemoryStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), MemoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS memory (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                chat_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                ts TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| MemoryError::StorageError(e.to_string()))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_memory ON memory(chat_id, user_id, ts)")
            .execute(&self.pool)
            .await
            .map_err(|e| MemoryError::StorageError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl MemoryStore for SqliteMemoryStore {
    async fn add_turn(&self, turn: MemoryTurn) -> Result<(), MemoryError> {
        sqlx::query("INSERT INTO memory (chat_id, user_id, role, content, ts) VALUES (?, ?, ?, ?, ?)")
            .bind(turn.chat_id as i64)
            .bind(turn.user_id as i64)
            .bind(turn.role.as_str())
            .bind(&turn.content)
            .bind(turn.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true))
            .execute(&self.pool)
            .await
            .map_err(|e| MemoryError::StorageError(e.to_string()))?;
        Ok(())
    }

    async fn recent_turns(
        &self,
        chat_id: u64,
        user_id: u64,
        limit: u32,
    ) -> Result<Vec<MemoryTurn>, MemoryError> {
        let rows = sqlx::query(
            r#"
            SELECT role, content, ts FROM memory
            WHERE chat_id = ? AND user_id = ?
            ORDER BY ts DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(chat_id as i64)
        .bind(user_id as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MemoryError::StorageError(e.to_string()))?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in rows.into_iter().rev() {
            let role: String = row.get("role");
            let ts: String = row.get("ts");
            turns.push(MemoryTurn {
                chat_id,
                user_id,
                role: role.parse().map_err(MemoryError::StorageError)?,
                content: row.get("content"),
                timestamp: DateTime::parse_from_rfc3339(&ts)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| MemoryError::StorageError(e.to_string()))?,
            });
        }
        Ok(turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::ConversationMemory;
    use crate::infra::database::memory_pool;

    async fn store() -> SqliteMemoryStore {
        let store = SqliteMemoryStore::new(memory_pool().await);
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_recent_turns_are_chronological() {
        let memory = ConversationMemory::new(store().await, 2);
        memory.remember(1, 2, MemoryRole::User, "first").await.unwrap();
        memory
            .remember(1, 2, MemoryRole::Assistant, "second")
            .await
            .unwrap();
        memory.remember(1, 2, MemoryRole::User, "third").await.unwrap();

        let context = memory.context(1, 2).await.unwrap();

        let contents: Vec<&str> = context.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["second", "third"]);
        assert_eq!(context[0].role, MemoryRole::Assistant);
    }

    #[tokio::test]
    async fn test_turns_are_scoped_to_chat_and_user() {
        let store = store().await;
        let memory = ConversationMemory::new(store, 10);
        memory.remember(1, 2, MemoryRole::User, "mine").await.unwrap();
        memory.remember(1, 3, MemoryRole::User, "theirs").await.unwrap();
        memory.remember(4, 2, MemoryRole::User, "elsewhere").await.unwrap();

        let context = memory.context(1, 2).await.unwrap();

        assert_eq!(context.len(), 1);
        assert_eq!(context[0].content, "mine");
    }
}
