// Moderation domain models - data structures for the profanity escalation system.
//
// These are pure domain types with no Discord dependencies.
// The Discord layer turns verdicts into channel replies.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-(chat, user) infraction counters.
///
/// Created lazily on the first violation with both counters at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InfractionRecord {
    pub chat_id: u64,
    pub user_id: u64,
    /// Warnings since the last escalation mute
    pub warning_count: u32,
    /// Escalation mutes ever applied (never decreases)
    pub mute_count: u32,
}

impl InfractionRecord {
    /// The record a user has before their first violation.
    pub fn empty(chat_id: u64, user_id: u64) -> Self {
        Self {
            chat_id,
            user_id,
            warning_count: 0,
            mute_count: 0,
        }
    }
}

/// Thresholds that drive the warn -> mute -> ban state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct EscalationPolicy {
    /// Warnings that trigger a mute
    pub infraction_limit: u32,
    /// Escalation mutes that trigger a ban
    pub repeat_mute_threshold: u32,
    /// How long a mute lasts
    pub mute_duration: Duration,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            infraction_limit: 5,
            repeat_mute_threshold: 2,
            mute_duration: Duration::from_secs(12 * 60 * 60),
        }
    }
}

/// What the escalation engine did about a single violation.
#[derive(Debug, Clone, PartialEq)]
pub enum EscalationOutcome {
    /// Below the limit: the user only gets a warning
    Warned { warning_count: u32, limit: u32 },
    /// Limit reached and the restriction went through
    Muted { mute_count: u32, duration: Duration },
    /// Repeat offender: muted, then banned
    Banned { mute_count: u32, duration: Duration },
    /// Limit reached but the platform refused the restriction; counters untouched
    MuteFailed { warning_count: u32, reason: String },
    /// Muted, but the follow-up ban was refused
    BanFailed {
        mute_count: u32,
        duration: Duration,
        reason: String,
    },
}

/// Result of running a message through the moderation pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageVerdict {
    /// No disallowed term; the caller may hand the message to other handlers
    Clean,
    /// A violation was detected and escalated
    Violation(EscalationOutcome),
    /// A violation was detected but escalation aborted on a storage error
    Failed { reason: String },
}

impl MessageVerdict {
    /// Whether moderation consumed this message.
    pub fn handled(&self) -> bool {
        !matches!(self, MessageVerdict::Clean)
    }
}

/// Result of a member-reported mute.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    Muted { duration: Duration },
    /// The mute went through but its audit entry could not be written
    MutedUnrecorded { duration: Duration, reason: String },
    Failed { reason: String },
}

/// Where administrator notices are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeTarget {
    /// Direct message to a user
    User(u64),
    /// Post in a channel
    Channel(u64),
}
