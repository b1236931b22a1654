use std::env;

use crate::error::{PromptError, Result};
use crate::models::{EnhancerProfile, GeminiModel};
use crate::prompt::form::FormLayout;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 90;
pub const DEFAULT_WRAP_WIDTH: usize = 80;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            api_key_env: API_KEY_ENV.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// The API key itself is left unset so it is looked up when a request is made.
    pub fn from_env() -> Self {
        let base_url = env::var("GEMINI_BASE_URL")
            .ok()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        GeminiConfig {
            api_key: None,
            api_key_env: API_KEY_ENV.to_string(),
            base_url,
            timeout_secs,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Environment variable consulted when no explicit key is configured.
    pub fn with_api_key_env(mut self, name: impl Into<String>) -> Self {
        self.api_key_env = name.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Explicit key first, then the configured environment variable
    /// (`GEMINI_API_KEY` unless overridden).
    pub fn resolve_api_key(&self) -> Result<String> {
        let explicit = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(String::from);

        explicit
            .or_else(|| {
                env::var(&self.api_key_env)
                    .ok()
                    .map(|key| key.trim().to_string())
                    .filter(|key| !key.is_empty())
            })
            .ok_or_else(|| {
                PromptError::ConfigError(format!(
                    "{} is not set; add it to your environment or .env file",
                    self.api_key_env
                ))
            })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub default_model: GeminiModel,
    pub wrap_width: usize,
    pub form_layout: FormLayout,
    pub profile: EnhancerProfile,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gemini: GeminiConfig::default(),
            default_model: GeminiModel::default(),
            wrap_width: DEFAULT_WRAP_WIDTH,
            form_layout: FormLayout::default(),
            profile: EnhancerProfile::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        let default_model = match env::var("GEMINI_MODEL") {
            Ok(id) if !id.trim().is_empty() => id
                .parse::<GeminiModel>()
                .map_err(|e| PromptError::ConfigError(format!("GEMINI_MODEL: {}", e)))?,
            _ => GeminiModel::default(),
        };
        let wrap_width = env::var("PROMPT_WRAP_WIDTH")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .filter(|width| *width > 0)
            .unwrap_or(DEFAULT_WRAP_WIDTH);
        let form_layout = match env::var("PROMPT_FORM_LAYOUT") {
            Ok(name) if !name.trim().is_empty() => FormLayout::from_name(&name)?,
            _ => FormLayout::default(),
        };
        let profile = match env::var("PROMPT_PROFILE") {
            Ok(name) if !name.trim().is_empty() => EnhancerProfile::from_name(&name)?,
            _ => EnhancerProfile::default(),
        };

        Ok(Config {
            gemini: GeminiConfig::from_env(),
            default_model,
            wrap_width,
            form_layout,
            profile,
        })
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_model(mut self, model: GeminiModel) -> Self {
        self.default_model = model;
        self
    }

    pub fn with_wrap_width(mut self, width: usize) -> Self {
        self.wrap_width = width;
        self
    }

    pub fn with_form_layout(mut self, layout: FormLayout) -> Self {
        self.form_layout = layout;
        self
    }

    pub fn with_profile(mut self, profile: EnhancerProfile) -> Self {
        self.profile = profile;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_api_key_wins() {
        let config = GeminiConfig::new().with_api_key("  secret-key ");
        assert_eq!(config.resolve_api_key().unwrap(), "secret-key");
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let config = GeminiConfig::new()
            .with_api_key("   ")
            .with_api_key_env("RGENPROMPT_TEST_UNSET_KEY");
        let err = config.resolve_api_key().unwrap_err();
        assert!(matches!(err, PromptError::ConfigError(_)));
        assert!(err.to_string().contains("RGENPROMPT_TEST_UNSET_KEY"));
    }

    #[test]
    fn test_key_from_configured_env_var() {
        env::set_var("RGENPROMPT_TEST_SET_KEY", " env-key ");
        let config = GeminiConfig::new().with_api_key_env("RGENPROMPT_TEST_SET_KEY");
        assert_eq!(config.resolve_api_key().unwrap(), "env-key");
    }

    #[test]
    fn test_builder_defaults() {
        let config = Config::new()
            .with_wrap_width(60)
            .with_gemini(GeminiConfig::new().with_base_url("http://localhost:8080/v1beta/"));
        assert_eq!(config.wrap_width, 60);
        assert_eq!(config.gemini.base_url, "http://localhost:8080/v1beta");
        assert_eq!(config.gemini.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.default_model, GeminiModel::Flash0520);
    }
}
