use std::sync::Arc;

use serde::Serialize;

use crate::{
    config::Config,
    error::Result,
    gemini::GeminiClient,
    history::HistorySink,
    logger::RequestScope,
    models::{GeminiModel, GenerationRequest, HistoryEntry, OptionSet},
    prompt::{compose, format_prompt, FormInput},
};

/// What one successful round trip produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interaction {
    pub input_prompt: String,
    pub formatted_prompt: String,
    pub explanation: Option<String>,
    pub model: GeminiModel,
    pub timestamp: String,
}

/// Runs the compose → generate → format → record pipeline for one form
/// submission at a time.
#[derive(Clone)]
pub struct PromptStudio {
    client: GeminiClient,
    history: Arc<dyn HistorySink>,
    config: Config,
}

impl PromptStudio {
    pub fn new(client: GeminiClient, history: Arc<dyn HistorySink>, config: Config) -> Self {
        Self {
            client,
            history,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn run(&self, options: &OptionSet) -> Result<Interaction> {
        let input_prompt = compose(options);
        log::info!("📝 Input prompt: {}", input_prompt);

        let request =
            GenerationRequest::for_profile(self.config.profile, input_prompt.as_str(), options.model());
        let result = self.client.text().generate_request(request).await?;
        let enhanced = result.require_prompt()?;

        let formatted_prompt = format_prompt(enhanced, self.config.wrap_width);
        let entry = HistoryEntry::new(formatted_prompt.as_str(), input_prompt.as_str(), options.model());
        let timestamp = entry.timestamp.clone();
        self.history.append(entry)?;

        log::info!(
            "✅ Enhanced prompt ready ({} characters)",
            formatted_prompt.len()
        );

        Ok(Interaction {
            input_prompt,
            formatted_prompt,
            explanation: result.explanation,
            model: options.model(),
            timestamp,
        })
    }

    /// Form entry point. Every failure comes back as the text to show the
    /// user; nothing is recorded in history unless a prompt was produced.
    pub async fn submit(&self, input: FormInput) -> std::result::Result<Interaction, String> {
        let scope = RequestScope::begin();
        log::debug!("Handling submission {}", scope.id());

        let outcome = match input.into_option_set(self.config.form_layout) {
            Ok(options) => self.run(&options).await,
            Err(e) => Err(e),
        };

        outcome.map_err(|e| {
            if e.is_generation_failure() {
                log::error!("Generation failed: {}", e);
            } else {
                log::warn!("Submission rejected: {}", e);
            }
            e.user_message()
        })
    }
}
