use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of moderation action taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Warn,
    Mute,
    Ban,
    /// Mute applied because a member reported the content
    MuteOnReport,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Warn => "warn",
            AuditAction::Mute => "mute",
            AuditAction::Ban => "ban",
            AuditAction::MuteOnReport => "mute_on_report",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warn" => Ok(AuditAction::Warn),
            "mute" => Ok(AuditAction::Mute),
            "ban" => Ok(AuditAction::Ban),
            "mute_on_report" => Ok(AuditAction::MuteOnReport),
            other => Err(format!("unknown audit action: {other}")),
        }
    }
}

/// An audit entry before it has been written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub chat_id: u64,
    pub target_user_id: u64,
    /// Acting principal: the bot, or the member who reported
    pub moderator_id: u64,
    pub action: AuditAction,
    pub reason: String,
}

/// An audit entry as stored. Never modified after it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub chat_id: u64,
    pub target_user_id: u64,
    pub moderator_id: u64,
    pub action: AuditAction,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_tags_parse_back() {
        for action in [
            AuditAction::Warn,
            AuditAction::Mute,
            AuditAction::Ban,
            AuditAction::MuteOnReport,
        ] {
            assert_eq!(action.as_str().parse::<AuditAction>(), Ok(action));
        }
        assert!("kick".parse::<AuditAction>().is_err());
    }
}
