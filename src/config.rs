// Runtime configuration read from the environment (`.env` is loaded first in main).

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context as _};

use crate::core::moderation::{EscalationPolicy, NoticeTarget, DEFAULT_REPORT_PHRASES};

// Discord caps member timeouts at 28 days
pub const MAX_MUTE_DURATION_HOURS: u64 = 28 * 24;

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub database_path: PathBuf,
    pub profanity_list_path: PathBuf,
    pub infraction_limit: u32,
    pub mute_duration_hours: u64,
    pub repeat_mute_threshold: u32,
    pub admin_id: Option<u64>,
    pub admin_channel_id: Option<u64>,
    pub memory_length: u32,
    pub platform_timeout: Duration,
    pub report_phrases: Vec<String>,
}

impl BotConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let discord_token =
            get("DISCORD_TOKEN").ok_or_else(|| anyhow!("Missing DISCORD_TOKEN environment variable"))?;

        let data_dir = PathBuf::from(get("DATA_DIR").unwrap_or_else(|| "data".to_string()));
        let database_path = get("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("bot.db"));
        let profanity_list_path = get("PROFANITY_LIST_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("profanity.json"));

        let report_phrases = match get("REPORT_PHRASES") {
            Some(raw) => raw
                .split('|')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_REPORT_PHRASES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        };

        let mute_duration_hours = positive(&get, "MUTE_DURATION_HOURS", 12)?;
        if mute_duration_hours > MAX_MUTE_DURATION_HOURS {
            return Err(anyhow!(
                "MUTE_DURATION_HOURS must be at most {MAX_MUTE_DURATION_HOURS} (28 days)"
            ));
        }

        Ok(Self {
            discord_token,
            database_path,
            profanity_list_path,
            infraction_limit: positive(&get, "INFRACTION_LIMIT", 5)?,
            mute_duration_hours,
            repeat_mute_threshold: positive(&get, "REPEAT_MUTE_THRESHOLD", 2)?,
            admin_id: optional_id(&get, "ADMIN_ID")?,
            admin_channel_id: optional_id(&get, "ADMIN_CHANNEL_ID")?,
            memory_length: positive(&get, "MEMORY_LENGTH", 12)?,
            platform_timeout: Duration::from_secs(positive(&get, "PLATFORM_TIMEOUT_SECS", 10)?),
            report_phrases,
        })
    }

    pub fn escalation_policy(&self) -> EscalationPolicy {
        EscalationPolicy {
            infraction_limit: self.infraction_limit,
            repeat_mute_threshold: self.repeat_mute_threshold,
            mute_duration: Duration::from_secs(self.mute_duration_hours * 60 * 60),
        }
    }

    /// DM to the admin when one is configured, otherwise the admin channel.
    pub fn admin_target(&self) -> Option<NoticeTarget> {
        self.admin_id
            .map(NoticeTarget::User)
            .or(self.admin_channel_id.map(NoticeTarget::Channel))
    }
}

fn parse<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    get(key)
        .map(|raw| {
            raw.parse::<T>()
                .with_context(|| format!("Invalid value {raw:?} for {key}"))
        })
        .transpose()
}

fn positive<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr + PartialOrd + From<u8>,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = parse(get, key)?.unwrap_or(default);
    if value < T::from(1) {
        return Err(anyhow!("{key} must be at least 1"));
    }
    Ok(value)
}

// Zero means "not configured".
fn optional_id(get: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<u64>> {
    Ok(parse::<u64>(get, key)?.filter(|id| *id != 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<BotConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("DISCORD_TOKEN", "token")]).unwrap();

        assert_eq!(config.database_path, PathBuf::from("data").join("bot.db"));
        assert_eq!(
            config.profanity_list_path,
            PathBuf::from("data").join("profanity.json")
        );
        assert_eq!(config.escalation_policy(), EscalationPolicy::default());
        assert_eq!(config.memory_length, 12);
        assert_eq!(config.platform_timeout, Duration::from_secs(10));
        assert_eq!(config.report_phrases.len(), DEFAULT_REPORT_PHRASES.len());
        assert_eq!(config.admin_target(), None);
    }

    #[test]
    fn test_missing_token_is_an_error() {
        assert!(config(&[]).is_err());
        assert!(config(&[("DISCORD_TOKEN", "  ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("DISCORD_TOKEN", "token"),
            ("DATA_DIR", "/srv/bot"),
            ("INFRACTION_LIMIT", "3"),
            ("MUTE_DURATION_HOURS", "1"),
            ("REPEAT_MUTE_THRESHOLD", "4"),
            ("REPORT_PHRASES", "spam | scam||"),
        ])
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/srv/bot").join("bot.db"));
        let policy = config.escalation_policy();
        assert_eq!(policy.infraction_limit, 3);
        assert_eq!(policy.repeat_mute_threshold, 4);
        assert_eq!(policy.mute_duration, Duration::from_secs(3600));
        assert_eq!(config.report_phrases, vec!["spam", "scam"]);
    }

    #[test]
    fn test_invalid_number_names_the_variable() {
        let err = config(&[("DISCORD_TOKEN", "token"), ("INFRACTION_LIMIT", "five")]).unwrap_err();

        assert!(err.to_string().contains("INFRACTION_LIMIT"));
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let err = config(&[("DISCORD_TOKEN", "token"), ("INFRACTION_LIMIT", "0")]).unwrap_err();

        assert!(err.to_string().contains("INFRACTION_LIMIT"));
    }

    #[test]
    fn test_mute_longer_than_discord_timeout_cap_is_rejected() {
        let err = config(&[("DISCORD_TOKEN", "token"), ("MUTE_DURATION_HOURS", "673")]).unwrap_err();
        assert!(err.to_string().contains("MUTE_DURATION_HOURS"));

        let longest = config(&[("DISCORD_TOKEN", "token"), ("MUTE_DURATION_HOURS", "672")]).unwrap();
        assert_eq!(longest.mute_duration_hours, MAX_MUTE_DURATION_HOURS);
    }

    #[test]
    fn test_admin_dm_preferred_over_channel() {
        let both = config(&[
            ("DISCORD_TOKEN", "token"),
            ("ADMIN_ID", "42"),
            ("ADMIN_CHANNEL_ID", "7"),
        ])
        .unwrap();
        let channel_only = config(&[
            ("DISCORD_TOKEN", "token"),
            ("ADMIN_ID", "0"),
            ("ADMIN_CHANNEL_ID", "7"),
        ])
        .unwrap();

        assert_eq!(both.admin_target(), Some(NoticeTarget::User(42)));
        assert_eq!(channel_only.admin_target(), Some(NoticeTarget::Channel(7)));
    }
}
