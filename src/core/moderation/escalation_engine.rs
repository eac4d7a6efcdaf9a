// Escalation engine - the warn -> mute -> ban state machine.
//
// State lives entirely in the two counters of the infraction store:
// - Normal: warning_count below the limit, a violation only warns
// - Limit reached: mute, reset warnings, count the mute, audit, notify
// - Repeat offender: after enough escalation mutes, ban as well
//
// Restriction happens first; counters and audit are only touched once the
// platform accepted it. A rejected mute leaves the warnings where they are so
// the next violation tries again.

use super::moderation_models::{
    EscalationOutcome, EscalationPolicy, InfractionRecord, NoticeTarget, ReportOutcome,
};
use super::moderation_ports::{ChatPlatform, InfractionStore, ModerationError};
use crate::core::audit::{AuditAction, AuditEntry, AuditLog, NewAuditEntry};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const REASON_LIMIT_REACHED: &str = "profanity_limit_reached";
pub const REASON_REPEAT_OFFENDER: &str = "repeat_offender";
pub const REASON_REPORTED: &str = "reported_by_user";

pub struct EscalationEngine<S: InfractionStore, A: AuditLog, P: ChatPlatform> {
    store: S,
    audit: A,
    platform: P,
    policy: EscalationPolicy,
    admin: Option<NoticeTarget>,
    // (chat_id, user_id) -> lock held for the whole violation path
    key_locks: DashMap<(u64, u64), Arc<Mutex<()>>>,
}

impl<S: InfractionStore, A: AuditLog, P: ChatPlatform> EscalationEngine<S, A, P> {
    pub fn new(
        store: S,
        audit: A,
        platform: P,
        policy: EscalationPolicy,
        admin: Option<NoticeTarget>,
    ) -> Self {
        Self {
            store,
            audit,
            platform,
            policy,
            admin,
            key_locks: DashMap::new(),
        }
    }

    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    pub fn audit_log(&self) -> &A {
        &self.audit
    }

    fn key_lock(&self, chat_id: u64, user_id: u64) -> Arc<Mutex<()>> {
        self.key_locks
            .entry((chat_id, user_id))
            .or_default()
            .value()
            .clone()
    }

    /// Current counters for a user in a chat.
    pub async fn status(
        &self,
        chat_id: u64,
        user_id: u64,
    ) -> Result<InfractionRecord, ModerationError> {
        self.store.get(chat_id, user_id).await
    }

    /// Run one detected violation through the state machine.
    ///
    /// Violations for the same (chat, user) are processed one at a time.
    pub async fn handle_violation(
        &self,
        chat_id: u64,
        user_id: u64,
    ) -> Result<EscalationOutcome, ModerationError> {
        let lock = self.key_lock(chat_id, user_id);
        let outcome = {
            let _guard = lock.lock().await;
            self.apply_violation(chat_id, user_id).await
        };
        drop(lock);
        self.release_key_lock(chat_id, user_id);
        outcome
    }

    // Drop the entry once no other task holds or waits on it.
    fn release_key_lock(&self, chat_id: u64, user_id: u64) {
        self.key_locks
            .remove_if(&(chat_id, user_id), |_, lock| Arc::strong_count(lock) == 1);
    }

    async fn apply_violation(
        &self,
        chat_id: u64,
        user_id: u64,
    ) -> Result<EscalationOutcome, ModerationError> {
        let record = self.store.increment_warning(chat_id, user_id).await?;
        let limit = self.policy.infraction_limit;

        if record.warning_count < limit {
            tracing::info!(
                chat_id,
                user_id,
                warning_count = record.warning_count,
                limit,
                "Profanity warning issued"
            );
            return Ok(EscalationOutcome::Warned {
                warning_count: record.warning_count,
                limit,
            });
        }

        self.escalate(chat_id, user_id, record.warning_count).await
    }

    async fn escalate(
        &self,
        chat_id: u64,
        user_id: u64,
        warning_count: u32,
    ) -> Result<EscalationOutcome, ModerationError> {
        let duration = self.policy.mute_duration;

        if let Err(e) = self
            .platform
            .restrict_user(chat_id, user_id, duration)
            .await
        {
            tracing::warn!(chat_id, user_id, error = %e, "Failed to mute user at infraction limit");
            self.notify_admin(&format!(
                "❗ Could not mute user {} in chat {}: {}",
                user_id, chat_id, e
            ))
            .await;
            return Ok(EscalationOutcome::MuteFailed {
                warning_count,
                reason: e.to_string(),
            });
        }

        self.store.reset_warning(chat_id, user_id).await?;
        let mute_count = self.store.increment_mute(chat_id, user_id).await?;
        let moderator_id = self.platform.bot_user_id();
        self.record_audit(
            chat_id,
            user_id,
            moderator_id,
            AuditAction::Mute,
            REASON_LIMIT_REACHED,
        )
        .await?;

        tracing::info!(chat_id, user_id, mute_count, "User muted for profanity");
        self.notify_admin(&format!(
            "🔇 User {} muted in chat {} for profanity. Total mutes: {}",
            user_id, chat_id, mute_count
        ))
        .await;

        if mute_count < self.policy.repeat_mute_threshold {
            return Ok(EscalationOutcome::Muted {
                mute_count,
                duration,
            });
        }

        if let Err(e) = self
            .platform
            .ban_user(chat_id, user_id, REASON_REPEAT_OFFENDER)
            .await
        {
            tracing::warn!(chat_id, user_id, mute_count, error = %e, "Failed to ban repeat offender");
            self.notify_admin(&format!(
                "❗ Could not ban repeat offender {} in chat {}: {}",
                user_id, chat_id, e
            ))
            .await;
            return Ok(EscalationOutcome::BanFailed {
                mute_count,
                duration,
                reason: e.to_string(),
            });
        }

        self.record_audit(
            chat_id,
            user_id,
            moderator_id,
            AuditAction::Ban,
            REASON_REPEAT_OFFENDER,
        )
        .await?;

        tracing::info!(chat_id, user_id, mute_count, "Repeat offender banned");
        self.notify_admin(&format!(
            "⛔ User {} banned from chat {} (repeat offender, {} mutes)",
            user_id, chat_id, mute_count
        ))
        .await;

        Ok(EscalationOutcome::Banned {
            mute_count,
            duration,
        })
    }

    /// Mute the author of reported content right away.
    ///
    /// Direct moderator action: counters are neither read nor written.
    pub async fn report_mute(
        &self,
        chat_id: u64,
        target_user_id: u64,
        reporter_id: u64,
    ) -> Result<ReportOutcome, ModerationError> {
        let duration = self.policy.mute_duration;

        if let Err(e) = self
            .platform
            .restrict_user(chat_id, target_user_id, duration)
            .await
        {
            tracing::warn!(
                chat_id,
                target_user_id,
                reporter_id,
                error = %e,
                "Failed to mute reported user"
            );
            return Ok(ReportOutcome::Failed {
                reason: e.to_string(),
            });
        }

        self.record_audit(
            chat_id,
            target_user_id,
            reporter_id,
            AuditAction::MuteOnReport,
            REASON_REPORTED,
        )
        .await?;

        tracing::info!(chat_id, target_user_id, reporter_id, "User muted on report");
        self.notify_admin(&format!(
            "📣 Inappropriate content reported in chat {}: user {} muted, reported by {}",
            chat_id, target_user_id, reporter_id
        ))
        .await;

        Ok(ReportOutcome::Muted { duration })
    }

    async fn record_audit(
        &self,
        chat_id: u64,
        target_user_id: u64,
        moderator_id: u64,
        action: AuditAction,
        reason: &str,
    ) -> Result<AuditEntry, ModerationError> {
        let entry = NewAuditEntry {
            chat_id,
            target_user_id,
            moderator_id,
            action,
            reason: reason.to_string(),
        };

        match self.audit.record(entry).await {
            Ok(stored) => Ok(stored),
            Err(e) => {
                tracing::error!(chat_id, target_user_id, %action, error = %e, "Failed to write audit entry");
                self.notify_admin(&format!(
                    "❗ {} applied to user {} in chat {} but the audit entry could not be written: {}",
                    action, target_user_id, chat_id, e
                ))
                .await;
                Err(e.into())
            }
        }
    }

    /// Best-effort notice to the configured administrator.
    ///
    /// Delivery failures are logged, never returned.
    pub async fn notify_admin(&self, text: &str) {
        let Some(target) = self.admin else {
            tracing::debug!("No admin configured, skipping notice");
            return;
        };

        if let Err(e) = self.platform.send_notice(target, text).await {
            tracing::warn!(?target, error = %e, "Failed to deliver admin notice");
        }
    }
}
