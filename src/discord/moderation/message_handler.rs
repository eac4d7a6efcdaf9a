// Discord-specific moderation handling - translates core verdicts into channel replies.

use crate::core::moderation::{EscalationOutcome, MessageVerdict, ReportOutcome};
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;
use std::time::Duration;

/// Run a guild message through moderation, then treat it as a possible
/// complaint if it was clean and replies to another member.
pub async fn handle_message(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    // Skip bots
    if msg.author.bot {
        return Ok(());
    }

    // Only moderate guild messages
    let chat_id = match msg.guild_id {
        Some(id) => id.get(),
        None => return Ok(()),
    };
    let user_id = msg.author.id.get();

    let verdict = data.moderation.on_message(chat_id, user_id, &msg.content).await;
    if let Some(text) = verdict_reply(user_id, &verdict) {
        reply(ctx, msg, &text).await;
    }
    if verdict.handled() {
        return Ok(());
    }

    let target = match msg.referenced_message.as_deref() {
        Some(replied) if !replied.author.bot => replied.author.id.get(),
        _ => return Ok(()),
    };

    if let Some(outcome) = data
        .moderation
        .on_report(chat_id, user_id, target, &msg.content)
        .await
    {
        reply(ctx, msg, &report_reply(target, &outcome)).await;
    }

    Ok(())
}

async fn reply(ctx: &serenity::Context, msg: &serenity::Message, text: &str) {
    if let Err(e) = msg.reply(&ctx.http, text).await {
        tracing::warn!(channel_id = msg.channel_id.get(), error = %e, "Failed to send moderation reply");
    }
}

pub fn format_duration(duration: Duration) -> String {
    let hours = duration.as_secs() / 3600;
    match hours {
        0 => format!("{} minutes", duration.as_secs() / 60),
        1 => "1 hour".to_string(),
        n => format!("{} hours", n),
    }
}

/// Channel reply for a message verdict. `None` means stay silent.
pub fn verdict_reply(user_id: u64, verdict: &MessageVerdict) -> Option<String> {
    let outcome = match verdict {
        MessageVerdict::Violation(outcome) => outcome,
        // Storage failures only go to the admin
        MessageVerdict::Clean | MessageVerdict::Failed { .. } => return None,
    };

    let text = match outcome {
        EscalationOutcome::Warned {
            warning_count,
            limit,
        } => format!(
            "⚠️ <@{}> please keep it respectful. Warning {}/{}",
            user_id, warning_count, limit
        ),
        EscalationOutcome::Muted { duration, .. } => format!(
            "🔇 <@{}> has been muted for {}.",
            user_id,
            format_duration(*duration)
        ),
        EscalationOutcome::Banned { .. } => format!(
            "⛔ <@{}> has been banned for repeated disrespect.",
            user_id
        ),
        EscalationOutcome::MuteFailed { .. } => format!(
            "⚠️ <@{}> reached the warning limit, but I could not mute them. An admin has been notified.",
            user_id
        ),
        EscalationOutcome::BanFailed { duration, .. } => format!(
            "🔇 <@{}> has been muted for {}. The ban did not go through; an admin has been notified.",
            user_id,
            format_duration(*duration)
        ),
    };
    Some(text)
}

pub fn report_reply(target_user_id: u64, outcome: &ReportOutcome) -> String {
    match outcome {
        ReportOutcome::Muted { .. } => format!(
            "🔇 <@{}> has been muted until an admin reviews the report.",
            target_user_id
        ),
        ReportOutcome::MutedUnrecorded { .. } => format!(
            "🔇 <@{}> has been muted until an admin reviews the report. The action could not be logged; an admin has been notified.",
            target_user_id
        ),
        ReportOutcome::Failed { .. } => {
            "I couldn't mute that member. I might be missing permissions.".to_string()
        }
    }
}
