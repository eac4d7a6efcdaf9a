// In-memory stand-ins for the moderation ports, shared by the core tests.
//
// Each mock is cheap to clone and clones share state, so a test can hand one
// copy to a service and keep another to inspect what happened.

use super::moderation_models::{InfractionRecord, NoticeTarget};
use super::moderation_ports::{
    ChatPlatform, InfractionStore, ModerationError, PlatformError, WordListStore,
};
use crate::core::audit::{AuditEntry, AuditError, AuditLog, NewAuditEntry};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BOT_ID: u64 = 999;

// ----------------------------------------------------------------------------
// Infraction store
// ----------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockInfractionStore {
    records: Arc<DashMap<(u64, u64), InfractionRecord>>,
    fail_writes: Arc<AtomicBool>,
}

impl MockInfractionStore {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), ModerationError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ModerationError::StorageError("disk full".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl InfractionStore for MockInfractionStore {
    async fn increment_warning(
        &self,
        chat_id: u64,
        user_id: u64,
    ) -> Result<InfractionRecord, ModerationError> {
        self.check_writable()?;
        let mut record = self
            .records
            .entry((chat_id, user_id))
            .or_insert_with(|| InfractionRecord::empty(chat_id, user_id));
        record.warning_count += 1;
        Ok(*record)
    }

    async fn reset_warning(&self, chat_id: u64, user_id: u64) -> Result<(), ModerationError> {
        self.check_writable()?;
        if let Some(mut record) = self.records.get_mut(&(chat_id, user_id)) {
            record.warning_count = 0;
        }
        Ok(())
    }

    async fn increment_mute(&self, chat_id: u64, user_id: u64) -> Result<u32, ModerationError> {
        self.check_writable()?;
        let mut record = self
            .records
            .entry((chat_id, user_id))
            .or_insert_with(|| InfractionRecord::empty(chat_id, user_id));
        record.mute_count += 1;
        Ok(record.mute_count)
    }

    async fn get(&self, chat_id: u64, user_id: u64) -> Result<InfractionRecord, ModerationError> {
        Ok(self
            .records
            .get(&(chat_id, user_id))
            .map(|r| *r)
            .unwrap_or_else(|| InfractionRecord::empty(chat_id, user_id)))
    }
}

// ----------------------------------------------------------------------------
// Audit log
// ----------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockAuditLog {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MockAuditLog {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<&'static str> {
        self.entries().iter().map(|e| e.action.as_str()).collect()
    }
}

#[async_trait]
impl AuditLog for MockAuditLog {
    async fn record(&self, entry: NewAuditEntry) -> Result<AuditEntry, AuditError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AuditError::StorageError("audit table locked".to_string()));
        }
        let mut entries = self.entries.lock().unwrap();
        let stored = AuditEntry {
            id: entries.len() as i64 + 1,
            chat_id: entry.chat_id,
            target_user_id: entry.target_user_id,
            moderator_id: entry.moderator_id,
            action: entry.action,
            reason: entry.reason,
            timestamp: Utc::now(),
        };
        entries.push(stored.clone());
        Ok(stored)
    }

    async fn recent(&self, chat_id: u64, limit: u32) -> Result<Vec<AuditEntry>, AuditError> {
        Ok(self
            .entries()
            .into_iter()
            .rev()
            .filter(|e| e.chat_id == chat_id)
            .take(limit as usize)
            .collect())
    }
}

// ----------------------------------------------------------------------------
// Word list
// ----------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MemoryWordListStore {
    terms: Arc<Mutex<BTreeSet<String>>>,
    saves: Arc<AtomicUsize>,
    fail_saves: Arc<AtomicBool>,
}

impl MemoryWordListStore {
    pub fn with_terms(terms: &[&str]) -> Self {
        let store = Self::default();
        store.replace_terms(terms);
        store
    }

    pub fn replace_terms(&self, terms: &[&str]) {
        *self.terms.lock().unwrap() = terms.iter().map(|t| t.to_string()).collect();
    }

    pub fn saved_terms(&self) -> BTreeSet<String> {
        self.terms.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl WordListStore for MemoryWordListStore {
    async fn load(&self) -> Result<BTreeSet<String>, ModerationError> {
        Ok(self.saved_terms())
    }

    async fn save(&self, terms: &BTreeSet<String>) -> Result<(), ModerationError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(ModerationError::WordListError("read-only".to_string()));
        }
        *self.terms.lock().unwrap() = terms.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Chat platform
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    Restrict {
        chat_id: u64,
        user_id: u64,
        duration: Duration,
    },
    Ban {
        chat_id: u64,
        user_id: u64,
    },
    Notice {
        target: NoticeTarget,
        text: String,
    },
}

#[derive(Clone, Default)]
pub struct MockPlatform {
    calls: Arc<Mutex<Vec<PlatformCall>>>,
    fail_restrict: Arc<AtomicBool>,
    fail_ban: Arc<AtomicBool>,
    fail_notice: Arc<AtomicBool>,
}

impl MockPlatform {
    pub fn fail_restrict(&self, fail: bool) {
        self.fail_restrict.store(fail, Ordering::SeqCst);
    }

    pub fn fail_ban(&self, fail: bool) {
        self.fail_ban.store(fail, Ordering::SeqCst);
    }

    pub fn fail_notice(&self, fail: bool) {
        self.fail_notice.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn restrictions(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, PlatformCall::Restrict { .. }))
            .count()
    }

    pub fn bans(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, PlatformCall::Ban { .. }))
            .count()
    }

    pub fn notices(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PlatformCall::Notice { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    fn bot_user_id(&self) -> u64 {
        BOT_ID
    }

    async fn restrict_user(
        &self,
        chat_id: u64,
        user_id: u64,
        duration: Duration,
    ) -> Result<(), PlatformError> {
        if self.fail_restrict.load(Ordering::SeqCst) {
            return Err(PlatformError::Rejected("missing permissions".to_string()));
        }
        self.calls.lock().unwrap().push(PlatformCall::Restrict {
            chat_id,
            user_id,
            duration,
        });
        Ok(())
    }

    async fn ban_user(
        &self,
        chat_id: u64,
        user_id: u64,
        _reason: &str,
    ) -> Result<(), PlatformError> {
        if self.fail_ban.load(Ordering::SeqCst) {
            return Err(PlatformError::Rejected("missing permissions".to_string()));
        }
        self.calls
            .lock()
            .unwrap()
            .push(PlatformCall::Ban { chat_id, user_id });
        Ok(())
    }

    async fn send_notice(&self, target: NoticeTarget, text: &str) -> Result<(), PlatformError> {
        if self.fail_notice.load(Ordering::SeqCst) {
            return Err(PlatformError::TimedOut(Duration::from_secs(10)));
        }
        self.calls.lock().unwrap().push(PlatformCall::Notice {
            target,
            text: text.to_string(),
        });
        Ok(())
    }
}
