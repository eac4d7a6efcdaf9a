// This is the entry point of the moderation bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (SQLite, JSON files)
// - `discord/` = Discord-specific adapters (platform, commands, events)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize stores (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::BotConfig;
use crate::core::memory::ConversationMemory;
use crate::core::moderation::{EscalationEngine, ModerationService, ProfanityFilter};
use crate::discord::moderation::{commands, message_handler, SerenityPlatform};
use crate::discord::{Data, Error};
use crate::infra::audit::SqliteAuditStore;
use crate::infra::database::open_pool;
use crate::infra::memory::SqliteMemoryStore;
use crate::infra::moderation::{JsonWordListStore, SqliteInfractionStore};
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Event handler for non-command Discord events.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            message_handler::handle_message(ctx, new_message, data).await?;
        }
        serenity::FullEvent::GuildCreate { guild, .. } => {
            tracing::debug!(guild_id = guild.id.get(), "Guild available");
        }
        _ => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = BotConfig::from_env()?;
    let policy = config.escalation_policy();
    tracing::info!(
        infraction_limit = policy.infraction_limit,
        repeat_mute_threshold = policy.repeat_mute_threshold,
        mute_hours = config.mute_duration_hours,
        admin_configured = config.admin_target().is_some(),
        "Configuration loaded"
    );

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Stores are created and migrated here; the platform adapter needs the
    // bot's own id, so the services are assembled in the setup hook below.

    let pool = open_pool(&config.database_path)
        .await
        .context("Failed to open database")?;

    let infraction_store = SqliteInfractionStore::new(pool.clone());
    infraction_store
        .migrate()
        .await
        .context("Failed to migrate infractions table")?;

    let audit_store = SqliteAuditStore::new(pool.clone());
    audit_store
        .migrate()
        .await
        .context("Failed to migrate audit table")?;

    let memory_store = SqliteMemoryStore::new(pool);
    memory_store
        .migrate()
        .await
        .context("Failed to migrate memory table")?;
    let memory = Arc::new(ConversationMemory::new(memory_store, config.memory_length));

    let filter = ProfanityFilter::load(JsonWordListStore::new(&config.profanity_list_path))
        .await
        .context("Failed to load word list")?;
    tracing::info!(
        terms = filter.terms().await.len(),
        path = %config.profanity_list_path.display(),
        "Word list loaded"
    );

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
        | serenity::GatewayIntents::GUILDS;

    let token = config.discord_token.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::warns(),
                commands::badword(),
                commands::audit(),
                commands::help(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                tracing::info!(bot = %ready.user.name, "Bot is starting up");

                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                let platform = SerenityPlatform::new(
                    ctx.http.clone(),
                    ready.user.id.get(),
                    config.platform_timeout,
                );
                let engine = EscalationEngine::new(
                    infraction_store,
                    audit_store,
                    platform,
                    policy,
                    config.admin_target(),
                );
                let moderation = ModerationService::new(filter, engine, &config.report_phrases);

                tracing::info!("Commands registered, bot is ready");
                Ok(Data {
                    moderation: Arc::new(moderation),
                    memory,
                })
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;
    Ok(())
}
