// Profanity matching and the admin-editable word set.
//
// Matching is substring-per-token: a token is flagged when any listed term
// appears inside it, so suffixed and prefixed variants are caught too.
// The false positives this produces are tuned away by curating the list.

use super::moderation_ports::{ModerationError, WordListStore};
use super::normalizer::normalize;
use std::collections::{BTreeSet, HashSet};
use tokio::sync::RwLock;

/// Split normalized text into word-like runs.
pub fn tokenize(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split(|c: char| !is_word_char(c))
        .filter(|token| !token.is_empty())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || ('\u{0600}'..='\u{06FF}').contains(&c)
}

/// Whether any token of `normalized` contains one of `words`.
///
/// Both sides are expected to be normalized already. Empty words never match.
pub fn is_match<'a, I>(normalized: &str, words: I) -> bool
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    tokenize(normalized).any(|token| {
        words
            .clone()
            .into_iter()
            .any(|word| !word.is_empty() && token.contains(word))
    })
}

/// Normalized form of a listed term, if it can ever match.
///
/// Matching works token by token, so a term must normalize to exactly one token.
pub fn matchable_form(term: &str) -> Option<String> {
    let normalized = normalize(term.trim());
    let mut tokens = tokenize(&normalized);
    match (tokens.next(), tokens.next()) {
        (Some(token), None) if token == normalized => Some(normalized.clone()),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct WordSet {
    /// Terms as persisted
    raw: BTreeSet<String>,
    /// Normalized forms used for matching
    normalized: HashSet<String>,
}

impl WordSet {
    fn from_terms(raw: BTreeSet<String>) -> Self {
        let normalized = raw
            .iter()
            .filter_map(|term| {
                let form = matchable_form(term);
                if form.is_none() {
                    tracing::warn!(term = %term, "Listed term is not a single word and will never match");
                }
                form
            })
            .collect();
        Self { raw, normalized }
    }
}

/// The process-wide disallowed-term set, with persistence injected.
pub struct ProfanityFilter<W: WordListStore> {
    store: W,
    words: RwLock<WordSet>,
}

impl<W: WordListStore> ProfanityFilter<W> {
    /// Load the stored list once and build the filter around it.
    pub async fn load(store: W) -> Result<Self, ModerationError> {
        let raw = store.load().await?;
        tracing::info!(terms = raw.len(), "Loaded profanity word list");
        Ok(Self {
            store,
            words: RwLock::new(WordSet::from_terms(raw)),
        })
    }

    /// Normalize `text` and check it against the current set.
    pub async fn contains_profanity(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let normalized = normalize(text);
        let words = self.words.read().await;
        is_match(&normalized, words.normalized.iter().map(String::as_str))
    }

    /// Whether `term` is already in the set (compared after normalization).
    pub async fn contains(&self, term: &str) -> bool {
        let normalized = normalize(term.trim());
        self.words.read().await.normalized.contains(&normalized)
    }

    /// Add a term, persisting it before it takes effect.
    ///
    /// Returns `false` if an equivalent term was already listed.
    pub async fn add(&self, term: &str) -> Result<bool, ModerationError> {
        let term = term.trim();
        let normalized =
            matchable_form(term).ok_or_else(|| ModerationError::InvalidTerm(term.to_string()))?;

        // Held across the save so concurrent adds cannot drop each other's term.
        let mut words = self.words.write().await;
        if words.normalized.contains(&normalized) {
            return Ok(false);
        }

        let mut raw = words.raw.clone();
        raw.insert(term.to_string());
        self.store.save(&raw).await?;

        words.raw = raw;
        words.normalized.insert(normalized);
        tracing::info!(terms = words.raw.len(), "Added term to profanity word list");
        Ok(true)
    }

    /// Re-read the persisted list, replacing the in-memory set. Returns the new size.
    pub async fn reload(&self) -> Result<usize, ModerationError> {
        let raw = self.store.load().await?;
        let count = raw.len();
        *self.words.write().await = WordSet::from_terms(raw);
        tracing::info!(terms = count, "Reloaded profanity word list");
        Ok(count)
    }

    /// Sorted snapshot of the listed terms.
    pub async fn terms(&self) -> Vec<String> {
        self.words.read().await.raw.iter().cloned().collect()
    }
}
