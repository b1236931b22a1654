use crate::{error::Result, models::HistoryEntry};

/// Where finished prompts go. The pipeline only ever appends.
pub trait HistorySink: Send + Sync {
    fn append(&self, entry: HistoryEntry) -> Result<()>;
}
