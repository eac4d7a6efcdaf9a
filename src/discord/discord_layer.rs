// Discord layer - serenity adapter, message handling and slash commands.
//
// `Data` also carries the conversation memory. It shares the moderation
// database and is migrated at startup so that chat features can be added as
// commands without touching the composition root; none are registered today.

#[path = "moderation/mod.rs"]
pub mod moderation;

use crate::core::memory::ConversationMemory;
use crate::core::moderation::ModerationService;
use crate::infra::audit::SqliteAuditStore;
use crate::infra::memory::SqliteMemoryStore;
use crate::infra::moderation::{JsonWordListStore, SqliteInfractionStore};
use moderation::SerenityPlatform;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

pub type Moderation =
    ModerationService<SqliteInfractionStore, SqliteAuditStore, JsonWordListStore, SerenityPlatform>;

/// Shared state handed to every command and event.
pub struct Data {
    pub moderation: Arc<Moderation>,
    #[allow(dead_code)]
    pub memory: Arc<ConversationMemory<SqliteMemoryStore>>,
}
