//! Turns a handful of image options into an enhanced image-generation prompt
//! using Gemini.

pub mod config;
pub mod error;
pub mod gemini;
pub mod history;
pub mod logger;
pub mod models;
pub mod prompt;
pub mod studio;

pub use config::{Config, GeminiConfig};
pub use error::{PromptError, Result};
pub use gemini::{GeminiClient, GenerationBackend, TextClient};
pub use history::{HistorySink, SessionHistory};
pub use models::*;
pub use prompt::{compose, format_prompt, FormInput, FormLayout};
pub use studio::{Interaction, PromptStudio};
