// Moderation service - entry point the Discord layer calls for every message.
//
// This service handles:
// - Profanity detection (normalizer + word set)
// - Handing violations to the escalation engine
// - Member reports that mute the reported author directly
// - The small admin surface (status, word list, audit trail)
//
// NO Discord dependencies here - just pure domain logic.

use super::escalation_engine::EscalationEngine;
use super::moderation_models::{InfractionRecord, MessageVerdict, ReportOutcome};
use super::moderation_ports::{ChatPlatform, InfractionStore, ModerationError, WordListStore};
use super::normalizer::normalize;
use super::profanity_filter::ProfanityFilter;
use crate::core::audit::{AuditEntry, AuditLog};

/// Complaint phrases recognised when a member replies to a message.
pub const DEFAULT_REPORT_PHRASES: &[&str] = &[
    "اون محتوای غیر اخلاقی فرستاد",
    "محتوای جنسی فرستاد",
    "sent inappropriate content",
    "sent sexual content",
];

pub struct ModerationService<S, A, W, P>
where
    S: InfractionStore,
    A: AuditLog,
    W: WordListStore,
    P: ChatPlatform,
{
    filter: ProfanityFilter<W>,
    engine: EscalationEngine<S, A, P>,
    /// Normalized complaint phrases
    report_phrases: Vec<String>,
}

impl<S, A, W, P> ModerationService<S, A, W, P>
where
    S: InfractionStore,
    A: AuditLog,
    W: WordListStore,
    P: ChatPlatform,
{
    pub fn new(
        filter: ProfanityFilter<W>,
        engine: EscalationEngine<S, A, P>,
        report_phrases: &[String],
    ) -> Self {
        let report_phrases = report_phrases
            .iter()
            .map(|p| normalize(p.trim()))
            .filter(|p| !p.is_empty())
            .collect();

        Self {
            filter,
            engine,
            report_phrases,
        }
    }

    pub fn engine(&self) -> &EscalationEngine<S, A, P> {
        &self.engine
    }

    /// Check a message and escalate if it contains a disallowed term.
    ///
    /// Never returns an error: storage failures are logged, reported to the
    /// admin and turned into `MessageVerdict::Failed`.
    pub async fn on_message(&self, chat_id: u64, user_id: u64, text: &str) -> MessageVerdict {
        if !self.filter.contains_profanity(text).await {
            return MessageVerdict::Clean;
        }

        match self.engine.handle_violation(chat_id, user_id).await {
            Ok(outcome) => MessageVerdict::Violation(outcome),
            Err(e) => {
                tracing::error!(chat_id, user_id, error = %e, "Escalation aborted");
                self.engine
                    .notify_admin(&format!(
                        "⚠️ Moderation of user {} in chat {} failed: {}",
                        user_id, chat_id, e
                    ))
                    .await;
                MessageVerdict::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Whether `text` contains one of the complaint phrases.
    pub fn is_report(&self, text: &str) -> bool {
        let normalized = normalize(text);
        self.report_phrases
            .iter()
            .any(|phrase| normalized.contains(phrase.as_str()))
    }

    /// Handle a reply that may be a complaint about the replied-to author.
    ///
    /// Returns `None` when the text is not a complaint or the member reported
    /// themselves.
    pub async fn on_report(
        &self,
        chat_id: u64,
        reporter_id: u64,
        target_user_id: u64,
        text: &str,
    ) -> Option<ReportOutcome> {
        if reporter_id == target_user_id || !self.is_report(text) {
            return None;
        }

        match self
            .engine
            .report_mute(chat_id, target_user_id, reporter_id)
            .await
        {
            Ok(outcome) => Some(outcome),
            // Only the audit write can fail once the restriction succeeded
            Err(ModerationError::Audit(e)) => {
                tracing::error!(chat_id, target_user_id, reporter_id, error = %e, "Report mute not recorded");
                Some(ReportOutcome::MutedUnrecorded {
                    duration: self.engine.policy().mute_duration,
                    reason: e.to_string(),
                })
            }
            Err(e) => {
                tracing::error!(chat_id, target_user_id, reporter_id, error = %e, "Report mute aborted");
                Some(ReportOutcome::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Warning and mute counts for the "show my warnings" command.
    pub async fn get_status(
        &self,
        chat_id: u64,
        user_id: u64,
    ) -> Result<InfractionRecord, ModerationError> {
        self.engine.status(chat_id, user_id).await
    }

    /// Admin command: add a term to the word list.
    pub async fn add_word(&self, term: &str) -> Result<bool, ModerationError> {
        self.filter.add(term).await
    }

    /// Admin command: re-read the word list from storage.
    pub async fn reload_words(&self) -> Result<usize, ModerationError> {
        self.filter.reload().await
    }

    pub async fn words(&self) -> Vec<String> {
        self.filter.terms().await
    }

    pub async fn recent_audit(
        &self,
        chat_id: u64,
        limit: u32,
    ) -> Result<Vec<AuditEntry>, ModerationError> {
        Ok(self.engine.audit_log().recent(chat_id, limit).await?)
    }
}
