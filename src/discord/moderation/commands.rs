// Moderation slash commands.

use crate::core::moderation::ModerationError;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

const DEFAULT_AUDIT_LIMIT: u32 = 10;
const MAX_AUDIT_LIMIT: u32 = 25;
// Keeps the /badword list embed under Discord's description limit
const MAX_LISTED_CHARS: usize = 3900;

/// Show your own warning and mute counts in this server.
#[poise::command(slash_command, guild_only)]
pub async fn warns(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let record = ctx
        .data()
        .moderation
        .get_status(guild_id.get(), ctx.author().id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?;
    let policy = ctx.data().moderation.engine().policy();

    ctx.send(
        poise::CreateReply::default()
            .content(format!(
                "Warnings: {}/{} | Mutes: {}",
                record.warning_count, policy.infraction_limit, record.mute_count
            ))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Manage the disallowed word list.
#[poise::command(
    slash_command,
    subcommands("add", "reload", "list"),
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn badword(_ctx: Context<'_>) -> Result<(), Error> {
    // Parent command - only subcommands do anything
    Ok(())
}

/// Add a term to the word list.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Single word to block (matched inside longer words too)"] term: String,
) -> Result<(), Error> {
    let reply = match ctx.data().moderation.add_word(&term).await {
        Ok(true) => format!("✅ Added: {}", term.trim()),
        Ok(false) => format!("ℹ️ Already on the list: {}", term.trim()),
        Err(ModerationError::InvalidTerm(_)) => {
            "❌ Terms must be a single word: letters, digits or `_`, no spaces.".to_string()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to add word");
            format!("❌ Could not save the word list: {}", e)
        }
    };

    tracing::info!(user_id = ctx.author().id.get(), term = %term.trim(), "Word list add requested");
    ctx.say(reply).await?;
    Ok(())
}

/// Re-read the word list from disk.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn reload(ctx: Context<'_>) -> Result<(), Error> {
    let count = ctx
        .data()
        .moderation
        .reload_words()
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    ctx.say(format!("🔄 Word list reloaded: {} terms.", count))
        .await?;
    Ok(())
}

/// List the blocked terms.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let words = ctx.data().moderation.words().await;

    let embed = serenity::CreateEmbed::new()
        .title(format!("🚫 Blocked terms ({})", words.len()))
        .description(listing(&words))
        .color(0xFF0000);

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

fn listing(words: &[String]) -> String {
    if words.is_empty() {
        return "The list is empty.".to_string();
    }

    let mut text = String::new();
    for (shown, word) in words.iter().enumerate() {
        if text.len() + word.len() + 3 > MAX_LISTED_CHARS {
            text.push_str(&format!("… and {} more", words.len() - shown));
            break;
        }
        text.push_str(&format!("`{}` ", word));
    }
    text.trim_end().to_string()
}

/// Show recent moderation actions in this server.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn audit(
    ctx: Context<'_>,
    #[description = "Entries to show (default: 10, max: 25)"] limit: Option<u32>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    let limit = limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, MAX_AUDIT_LIMIT);

    let entries = ctx
        .data()
        .moderation
        .recent_audit(guild_id.get(), limit)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    let description = if entries.is_empty() {
        "No moderation actions recorded yet.".to_string()
    } else {
        entries
            .iter()
            .map(|e| {
                format!(
                    "<t:{}:R> **{}** <@{}> by <@{}> ({})",
                    e.timestamp.timestamp(),
                    e.action,
                    e.target_user_id,
                    e.moderator_id,
                    e.reason
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let embed = serenity::CreateEmbed::new()
        .title("📋 Moderation Audit")
        .description(description)
        .color(0x5865F2);

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// List the bot's commands.
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let embed = serenity::CreateEmbed::new()
        .title("🛡️ Chat Guard")
        .description(
            "I watch for disallowed language. Each offence is a warning; reaching the \
             limit gets you muted, and repeat mutes end in a ban.\n\
             Reply to a message with a complaint to have its author muted for review.",
        )
        .field("/warns", "Show your warning and mute counts", false)
        .field("/badword add | reload | list", "Manage the word list (admins)", false)
        .field("/audit [limit]", "Recent moderation actions (admins)", false)
        .color(0x00B894);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_empty() {
        assert_eq!(listing(&[]), "The list is empty.");
    }

    #[test]
    fn test_listing_formats_terms() {
        let words = vec!["alpha".to_string(), "beta".to_string()];

        assert_eq!(listing(&words), "`alpha` `beta`");
    }

    #[test]
    fn test_listing_truncates_long_lists() {
        let words: Vec<String> = (0..2000).map(|i| format!("term{}", i)).collect();

        let text = listing(&words);

        assert!(text.len() < MAX_LISTED_CHARS + 40);
        assert!(text.ends_with("more"));
    }
}
