use super::memory_models::{MemoryRole, MemoryTurn};
use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Memory storage error: {0}")]
    StorageError(String),
}

#[async_trait]
pub trait MemoryStore: Send + Sync {
    async fn add_turn(&self, turn: MemoryTurn) -> Result<(), MemoryError>;

    /// Latest `limit` turns for a user in a chat, oldest first.
    async fn recent_turns(
        &self,
        chat_id: u64,
        user_id: u64,
        limit: u32,
    ) -> Result<Vec<MemoryTurn>, MemoryError>;
}

/// Per-(chat, user) conversation history, bounded to the configured length.
pub struct ConversationMemory<S: MemoryStore> {
    store: S,
    memory_length: u32,
}

impl<S: MemoryStore> ConversationMemory<S> {
    pub fn new(store: S, memory_length: u32) -> Self {
        Self {
            store,
            memory_length,
        }
    }

    pub async fn remember(
        &self,
        chat_id: u64,
        user_id: u64,
        role: MemoryRole,
        content: &str,
    ) -> Result<(), MemoryError> {
        self.store
            .add_turn(MemoryTurn {
                chat_id,
                user_id,
                role,
                content: content.to_string(),
                timestamp: Utc::now(),
            })
            .await
    }

    /// The context window handed to the chat model, in chronological order.
    pub async fn context(&self, chat_id: u64, user_id: u64) -> Result<Vec<MemoryTurn>, MemoryError> {
        self.store
            .recent_turns(chat_id, user_id, self.memory_length)
            .await
    }
}
