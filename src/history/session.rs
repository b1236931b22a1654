use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::{
    error::{PromptError, Result},
    history::traits::HistorySink,
    models::HistoryEntry,
};

/// In-memory history for one interactive session.
#[derive(Debug, Default)]
pub struct SessionHistory {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<HistoryEntry>>> {
        self.entries
            .lock()
            .map_err(|_| PromptError::InternalError("history store lock poisoned".into()))
    }

    /// Snapshot in insertion order. A poisoned store reads as empty.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        match self.lock() {
            Ok(entries) => entries.clone(),
            Err(e) => {
                log::warn!("⚠️  Reading history as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Snapshot with the most recent entry first, the order the history view uses.
    pub fn latest_first(&self) -> Vec<HistoryEntry> {
        let mut entries = self.entries();
        entries.reverse();
        entries
    }

    pub fn len(&self) -> usize {
        match self.lock() {
            Ok(entries) => entries.len(),
            Err(e) => {
                log::warn!("⚠️  Reading history as empty: {}", e);
                0
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes entry `index` of the latest-first view (1-based, as shown to the
    /// user) to `dir` and returns the written path.
    pub fn export(&self, index: usize, dir: &Path) -> Result<PathBuf> {
        let entries = self.latest_first();
        let entry = index
            .checked_sub(1)
            .and_then(|i| entries.get(i))
            .ok_or_else(|| {
                PromptError::ValidationError(format!(
                    "No history entry #{} (have {})",
                    index,
                    entries.len()
                ))
            })?;

        let path = dir.join(entry.file_name());
        fs::write(&path, &entry.formatted_prompt)?;
        log::info!("💾 Prompt saved to: {}", path.display());
        Ok(path)
    }
}

impl HistorySink for SessionHistory {
    fn append(&self, entry: HistoryEntry) -> Result<()> {
        self.lock()?.push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeminiModel;
    use std::sync::Arc;

    fn entry(text: &str, timestamp: &str) -> HistoryEntry {
        HistoryEntry::new(text, "input", GeminiModel::default()).with_timestamp(timestamp)
    }

    #[test]
    fn test_append_keeps_order() {
        let history = SessionHistory::new();
        assert!(history.is_empty());

        history.append(entry("first", "2025-05-20 10:00:00")).unwrap();
        history.append(entry("second", "2025-05-20 10:00:05")).unwrap();

        let entries = history.entries();
        assert_eq!(history.len(), 2);
        assert_eq!(entries[0].formatted_prompt, "first");
        assert_eq!(history.latest_first()[0].formatted_prompt, "second");
    }

    #[test]
    fn test_export_writes_prompt_file() {
        let dir = tempfile::tempdir().unwrap();
        let history = SessionHistory::new();
        history.append(entry("A fox.\n\nIn snow.", "2025-05-20 10:00:00")).unwrap();
        history.append(entry("A cat.", "2025-05-20 11:30:15")).unwrap();

        let path = history.export(1, dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "prompt_2025-05-20_11-30-15.txt");
        assert_eq!(fs::read_to_string(&path).unwrap(), "A cat.");

        let path = history.export(2, dir.path()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "A fox.\n\nIn snow.");
    }

    #[test]
    fn test_poisoned_store_reads_empty_and_rejects_appends() {
        let history = Arc::new(SessionHistory::new());
        history.append(entry("kept", "2025-05-20 10:00:00")).unwrap();

        let poisoner = history.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries.lock().unwrap();
            panic!("poison the history lock");
        })
        .join();

        assert!(history.entries().is_empty());
        assert_eq!(history.len(), 0);
        assert!(history.is_empty());
        assert!(matches!(
            history.append(entry("lost", "2025-05-20 10:00:05")),
            Err(PromptError::InternalError(_))
        ));
    }

    #[test]
    fn test_export_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let history = SessionHistory::new();
        assert!(matches!(
            history.export(0, dir.path()),
            Err(PromptError::ValidationError(_))
        ));
        assert!(matches!(
            history.export(1, dir.path()),
            Err(PromptError::ValidationError(_))
        ));
    }
}
