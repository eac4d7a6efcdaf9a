// Ports for the moderation core.
//
// The core only talks to storage and the chat platform through these traits.
// SQLite / JSON / serenity implementations live in infra/ and discord/.

use super::moderation_models::{InfractionRecord, NoticeTarget};
use crate::core::audit::AuditError;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),

    #[error("Word list error: {0}")]
    WordListError(String),

    #[error("Invalid term: {0:?}")]
    InvalidTerm(String),
}

/// Failure of a call into the chat platform.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlatformError {
    #[error("Platform rejected the request: {0}")]
    Rejected(String),

    #[error("Platform call timed out after {0:?}")]
    TimedOut(Duration),
}

// ============================================================================
// STORAGE TRAITS
// ============================================================================

/// Durable per-(chat, user) counters.
///
/// Every mutation must be atomic per key and durable before returning.
#[async_trait]
pub trait InfractionStore: Send + Sync {
    /// Create the record if absent, add one warning, return the updated record.
    async fn increment_warning(
        &self,
        chat_id: u64,
        user_id: u64,
    ) -> Result<InfractionRecord, ModerationError>;

    /// Set the warning count back to zero. No-op if the record is absent.
    async fn reset_warning(&self, chat_id: u64, user_id: u64) -> Result<(), ModerationError>;

    /// Create the record if absent, add one mute, return the new mute count.
    async fn increment_mute(&self, chat_id: u64, user_id: u64) -> Result<u32, ModerationError>;

    /// Read the record; (0, 0) if absent.
    async fn get(&self, chat_id: u64, user_id: u64) -> Result<InfractionRecord, ModerationError>;
}

/// Durable storage for the disallowed-term list.
#[async_trait]
pub trait WordListStore: Send + Sync {
    /// Load every stored term. A store that was never written yields an empty set.
    async fn load(&self) -> Result<BTreeSet<String>, ModerationError>;

    /// Replace the stored list with `terms`.
    async fn save(&self, terms: &BTreeSet<String>) -> Result<(), ModerationError>;
}

// ============================================================================
// PLATFORM TRAIT
// ============================================================================

/// The narrow slice of the chat platform the moderation core needs.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Id of the bot account, recorded as moderator for automatic actions.
    fn bot_user_id(&self) -> u64;

    /// Prevent a user from sending messages for `duration`.
    async fn restrict_user(
        &self,
        chat_id: u64,
        user_id: u64,
        duration: Duration,
    ) -> Result<(), PlatformError>;

    /// Remove a user from the chat permanently.
    async fn ban_user(&self, chat_id: u64, user_id: u64, reason: &str)
        -> Result<(), PlatformError>;

    /// Best-effort text delivery.
    async fn send_notice(&self, target: NoticeTarget, text: &str) -> Result<(), PlatformError>;
}
