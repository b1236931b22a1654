use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PromptError;

/// Gemini model variants the enhancer is allowed to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GeminiModel {
    #[default]
    #[serde(rename = "gemini-2.5-flash-preview-05-20")]
    Flash0520,
    #[serde(rename = "gemini-2.5-flash-preview-04-17")]
    Flash0417,
    #[serde(rename = "gemini-2.5-pro-preview-05-06")]
    Pro0506,
}

impl GeminiModel {
    pub const ALL: [GeminiModel; 3] = [
        GeminiModel::Flash0520,
        GeminiModel::Flash0417,
        GeminiModel::Pro0506,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            GeminiModel::Flash0520 => "gemini-2.5-flash-preview-05-20",
            GeminiModel::Flash0417 => "gemini-2.5-flash-preview-04-17",
            GeminiModel::Pro0506 => "gemini-2.5-pro-preview-05-06",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GeminiModel::Flash0520 => "Gemini 2.5 Flash (05-20 preview)",
            GeminiModel::Flash0417 => "Gemini 2.5 Flash (04-17 preview)",
            GeminiModel::Pro0506 => "Gemini 2.5 Pro (05-06 preview)",
        }
    }
}

impl fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for GeminiModel {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        GeminiModel::ALL
            .iter()
            .copied()
            .find(|model| model.id() == wanted)
            .ok_or_else(|| PromptError::ValidationError(format!("Unsupported model: {}", wanted)))
    }
}

/// One decoded event of a streamed generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    pub chunk: String,
    pub done: bool,
    pub finish_reason: Option<String>,
}
