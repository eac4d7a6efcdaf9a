// Serenity implementation of the moderation platform port.
//
// chat_id is a guild id. A restriction is a member timeout, a ban is a guild
// ban, notices go to a DM or a channel. Every HTTP call is bounded by the
// configured timeout.

use crate::core::moderation::{ChatPlatform, NoticeTarget, PlatformError};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub struct SerenityPlatform {
    http: Arc<serenity::Http>,
    bot_id: u64,
    timeout: Duration,
}

impl SerenityPlatform {
    pub fn new(http: Arc<serenity::Http>, bot_id: u64, timeout: Duration) -> Self {
        Self {
            http,
            bot_id,
            timeout,
        }
    }
}

/// Run a serenity call under `limit`, mapping both failure modes.
async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, PlatformError>
where
    F: Future<Output = Result<T, serenity::Error>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(PlatformError::Rejected(e.to_string())),
        Err(_) => Err(PlatformError::TimedOut(limit)),
    }
}

fn timeout_until(duration: Duration) -> Result<serenity::Timestamp, PlatformError> {
    let until = chrono::Utc::now().timestamp() + duration.as_secs() as i64;
    serenity::Timestamp::from_unix_timestamp(until)
        .map_err(|e| PlatformError::Rejected(format!("Invalid timeout timestamp: {}", e)))
}

#[async_trait]
impl ChatPlatform for SerenityPlatform {
    fn bot_user_id(&self) -> u64 {
        self.bot_id
    }

    async fn restrict_user(
        &self,
        chat_id: u64,
        user_id: u64,
        duration: Duration,
    ) -> Result<(), PlatformError> {
        let until = timeout_until(duration)?;
        let guild_id = serenity::GuildId::new(chat_id);

        bounded(
            self.timeout,
            guild_id.edit_member(
                &self.http,
                serenity::UserId::new(user_id),
                serenity::EditMember::new().disable_communication_until_datetime(until),
            ),
        )
        .await
        .map(|_| ())
    }

    async fn ban_user(
        &self,
        chat_id: u64,
        user_id: u64,
        reason: &str,
    ) -> Result<(), PlatformError> {
        let guild_id = serenity::GuildId::new(chat_id);

        bounded(
            self.timeout,
            guild_id.ban_with_reason(&self.http, serenity::UserId::new(user_id), 0, reason),
        )
        .await
    }

    async fn send_notice(&self, target: NoticeTarget, text: &str) -> Result<(), PlatformError> {
        let sent = match target {
            NoticeTarget::User(id) => {
                bounded(self.timeout, async {
                    let dm = serenity::UserId::new(id)
                        .create_dm_channel(&self.http)
                        .await?;
                    dm.say(&self.http, text).await
                })
                .await
            }
            NoticeTarget::Channel(id) => {
                bounded(
                    self.timeout,
                    serenity::ChannelId::new(id).say(&self.http, text),
                )
                .await
            }
        };
        sent.map(|_| ())
    }
}
