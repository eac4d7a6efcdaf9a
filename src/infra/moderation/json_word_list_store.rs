use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::core::moderation::{ModerationError, WordListStore};

/// JSON array file holding the disallowed terms.
///
/// Writes go to a sibling temp file which is synced and then renamed over the
/// real one, so a crash never leaves a half-written list behind.
pub struct JsonWordListStore {
    path: PathBuf,
}

impl JsonWordListStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl WordListStore for JsonWordListStore {
    async fn load(&self) -> Result<BTreeSet<String>, ModerationError> {
        if !self.path.exists() {
            return Ok(BTreeSet::new());
        }

        let text = fs::read_to_string(&self.path)
            .await
            .map_err(|e| ModerationError::WordListError(e.to_string()))?;

        let terms: Vec<String> =
            serde_json::from_str(&text).map_err(|e| ModerationError::WordListError(e.to_string()))?;
        Ok(terms
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect())
    }

    async fn save(&self, terms: &BTreeSet<String>) -> Result<(), ModerationError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ModerationError::WordListError(e.to_string()))?;
            }
        }

        let text = serde_json::to_string_pretty(terms)
            .map_err(|e| ModerationError::WordListError(e.to_string()))?;

        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| ModerationError::WordListError(e.to_string()))?;
        file.write_all(text.as_bytes())
            .await
            .map_err(|e| ModerationError::WordListError(e.to_string()))?;
        file.sync_all()
            .await
            .map_err(|e| ModerationError::WordListError(e.to_string()))?;
        drop(file);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| ModerationError::WordListError(e.to_string()))
    }
}
