use super::audit_models::{AuditEntry, NewAuditEntry};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Audit storage error: {0}")]
    StorageError(String),
}

/// Append-only audit trail.
///
/// A failed write is always returned to the caller, never swallowed.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append an entry and return it as stored.
    async fn record(&self, entry: NewAuditEntry) -> Result<AuditEntry, AuditError>;

    /// Most recent entries for a chat, newest first.
    async fn recent(&self, chat_id: u64, limit: u32) -> Result<Vec<AuditEntry>, AuditError>;
}
