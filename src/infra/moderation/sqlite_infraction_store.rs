// SQLite-backed infraction store.
//
// Tables:
// - infractions: per (chat, user) warning and mute counters
//
// Every mutation is a single UPSERT ... RETURNING statement, so the
// read-modify-write of a counter is atomic even across pool connections.

use crate::core::moderation::{InfractionRecord, InfractionStore, ModerationError};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteInfractionStore {
    pool: Pool<Sqlite>,
}

impl SqliteInfractionStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), ModerationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS infractions (
                chat_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                warning_count INTEGER NOT NULL DEFAULT 0,
                mute_count INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (chat_id, user_id)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(())
    }

    fn record_from_row(chat_id: u64, user_id: u64, row: &SqliteRow) -> InfractionRecord {
        InfractionRecord {
            chat_id,
            user_id,
            warning_count: row.get::<i64, _>("warning_count").max(0) as u32,
            mute_count: row.get::<i64, _>("mute_count").max(0) as u32,
        }
    }
}

#[async_trait]
impl InfractionStore for SqliteInfractionStore {
    async fn increment_warning(
        &self,
        chat_id: u64,
        user_id: u64,
    ) -> Result<InfractionRecord, ModerationError> {
        let row = sqlx::query(
            r#"
            INSERT INTO infractions (chat_id, user_id, warning_count, mute_count, updated_at)
            VALUES (?, ?, 1, 0, ?)
            ON CONFLICT(chat_id, user_id) DO UPDATE SET
                warning_count = warning_count + 1,
                updated_at = excluded.updated_at
            RETURNING warning_count, mute_count
            "#,
        )
        .bind(chat_id as i64)
        .bind(user_id as i64)
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(Self::record_from_row(chat_id, user_id, &row))
    }

    async fn reset_warning(&self, chat_id: u64, user_id: u64) -> Result<(), ModerationError> {
        sqlx::query(
            r#"
            UPDATE infractions
            SET warning_count = 0, updated_at = ?
            WHERE chat_id = ? AND user_id = ?
            "#,
        )
        .bind(Utc::now().to_rfc3339())
        .bind(chat_id as i64)
        .bind(user_id as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;
        Ok(())
    }

    async fn increment_mute(&self, chat_id: u64, user_id: u64) -> Result<u32, ModerationError> {
        let row = sqlx::query(
            r#"
            INSERT INTO infractions (chat_id, user_id, warning_count, mute_count, updated_at)
            VALUES (?, ?, 0, 1, ?)
            ON CONFLICT(chat_id, user_id) DO UPDATE SET
                mute_count = mute_count + 1,
                updated_at = excluded.updated_at
            RETURNING mute_count
            "#,
        )
        .bind(chat_id as i64)
        .bind(user_id as i64)
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(row.get::<i64, _>("mute_count").max(0) as u32)
    }

    async fn get(&self, chat_id: u64, user_id: u64) -> Result<InfractionRecord, ModerationError> {
        let row = sqlx::query(
            "SELECT warning_count, mute_count FROM infractions WHERE chat_id = ? AND user_id = ?",
        )
        .bind(chat_id as i64)
        .bind(user_id as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(row
            .map(|r| Self::record_from_row(chat_id, user_id, &r))
            .unwrap_or_else(|| InfractionRecord::empty(chat_id, user_id)))
    }
}
