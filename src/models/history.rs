use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::models::GeminiModel;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub formatted_prompt: String,
    pub timestamp: String,
    pub input_prompt: String,
    pub model: GeminiModel,
}

impl HistoryEntry {
    pub fn new(
        formatted_prompt: impl Into<String>,
        input_prompt: impl Into<String>,
        model: GeminiModel,
    ) -> Self {
        Self {
            formatted_prompt: formatted_prompt.into(),
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            input_prompt: input_prompt.into(),
            model,
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// `prompt_2025-05-20_14-03-09.txt` for a `2025-05-20 14:03:09` entry.
    pub fn file_name(&self) -> String {
        format!(
            "prompt_{}.txt",
            self.timestamp.replace(':', "-").replace(' ', "_")
        )
    }
}
