use crate::core::audit::{AuditAction, AuditEntry, AuditError, AuditLog, NewAuditEntry};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteAuditStore {
    pool: Pool<Sqlite>,
}

impl SqliteAuditStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), AuditError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS audit (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                chat_id INTEGER NOT NULL,
                target_user_id INTEGER NOT NULL,
                moderator_id INTEGER NOT NULL,
                action TEXT NOT NULL,
                reason TEXT NOT NULL,
                ts TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AuditError::StorageError(e.to_string()))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_audit_chat ON audit(chat_id, ts)")
            .execute(&self.pool)
            .await
            .map_err(|e| AuditError::StorageError(e.to_string()))?;

        Ok(())
    }
}

// Fixed-width so that TEXT ordering is chronological ordering.
fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[async_trait]
impl AuditLog for SqliteAuditStore {
    async fn record(&self, entry: NewAuditEntry) -> Result<AuditEntry, AuditError> {
        let timestamp = Utc::now();

        let row = sqlx::query(
            r#"
            INSERT INTO audit (chat_id, target_user_id, moderator_id, action, reason, ts)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(entry.chat_id as i64)
        .bind(entry.target_user_id as i64)
        .bind(entry.moderator_id as i64)
        .bind(entry.action.as_str())
        .bind(&entry.reason)
        .bind(format_ts(&timestamp))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AuditError::StorageError(e.to_string()))?;

        Ok(AuditEntry {
            id: row.get("id"),
            chat_id: entry.chat_id,
            target_user_id: entry.target_user_id,
            moderator_id: entry.moderator_id,
            action: entry.action,
            reason: entry.reason,
            timestamp,
        })
    }

    async fn recent(&self, chat_id: u64, limit: u32) -> Result<Vec<AuditEntry>, AuditError> {
        let rows = sqlx::query(
            r#"
            SELECT id, target_user_id, moderator_id, action, reason, ts
            FROM audit
            WHERE chat_id = ?
            ORDER BY ts DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(chat_id as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AuditError::StorageError(e.to_string()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let action_str: String = row.get("action");
            let action = action_str
                .parse::<AuditAction>()
                .map_err(AuditError::StorageError)?;
            let ts_str: String = row.get("ts");
            let timestamp = DateTime::parse_from_rfc3339(&ts_str)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| AuditError::StorageError(e.to_string()))?;

            entries.push(AuditEntry {
                id: row.get("id"),
                chat_id,
                target_user_id: row.get::<i64, _>("target_user_id") as u64,
                moderator_id: row.get::<i64, _>("moderator_id") as u64,
                action,
                reason: row.get("reason"),
                timestamp,
            });
        }
        Ok(entries)
    }
}
