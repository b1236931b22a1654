use serde::{Deserialize, Serialize};

use crate::error::{PromptError, Result};
use crate::models::{AdvancedOptions, AspectRatio, GeminiModel, OptionSet};
use crate::prompt::styles::style_name;

/// Which form arrangement produced the input. Both feed the same composer;
/// they only differ in which toggles gate the background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormLayout {
    /// Solid background lives inside the advanced options.
    #[default]
    Nested,
    /// Solid background is its own toggle, independent of advanced options.
    Standalone,
}

impl FormLayout {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "nested" => Ok(FormLayout::Nested),
            "standalone" => Ok(FormLayout::Standalone),
            other => Err(PromptError::ConfigError(format!(
                "Unknown form layout '{}', expected 'nested' or 'standalone'",
                other
            ))),
        }
    }
}

/// Raw values of the form controls, before gating and validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormInput {
    pub description: String,
    pub photorealistic: bool,
    pub styles_enabled: bool,
    pub list_all_styles: bool,
    pub style_label: Option<String>,
    pub advanced_enabled: bool,
    pub background_enabled: bool,
    pub background_color: String,
    pub four_k: bool,
    pub bokeh: bool,
    pub aspect_ratio_enabled: bool,
    pub aspect_ratio: AspectRatio,
    pub extra_enabled: bool,
    pub extra_requirements: String,
    pub model: String,
}

impl Default for FormInput {
    fn default() -> Self {
        Self {
            description: String::new(),
            photorealistic: false,
            styles_enabled: true,
            list_all_styles: false,
            style_label: None,
            advanced_enabled: false,
            background_enabled: true,
            background_color: "#ffffff".to_string(),
            four_k: true,
            bokeh: false,
            aspect_ratio_enabled: false,
            aspect_ratio: AspectRatio::Square,
            extra_enabled: false,
            extra_requirements: String::new(),
            model: GeminiModel::default().id().to_string(),
        }
    }
}

impl FormInput {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    fn background_visible(&self, layout: FormLayout) -> bool {
        match layout {
            FormLayout::Nested => self.advanced_enabled && self.background_enabled,
            FormLayout::Standalone => self.background_enabled,
        }
    }

    pub fn into_option_set(self, layout: FormLayout) -> Result<OptionSet> {
        let model = self.model.parse::<GeminiModel>()?;
        let mut builder = OptionSet::builder(self.description.as_str())
            .photorealistic(self.photorealistic)
            .with_model(model);

        if self.photorealistic {
            return builder.build();
        }

        if self.styles_enabled {
            if let Some(label) = self.style_label.as_deref() {
                builder = builder.with_style(style_name(label));
            }
        }

        if self.background_visible(layout) {
            builder = builder.with_background_color(self.background_color.as_str());
        }

        if self.advanced_enabled {
            builder = builder.with_advanced(AdvancedOptions {
                resolution_4k: self.four_k,
                bokeh: self.bokeh,
                aspect_ratio: self.aspect_ratio_enabled.then_some(self.aspect_ratio),
                extra_requirements: self
                    .extra_enabled
                    .then(|| self.extra_requirements.clone()),
            });
        }

        builder.build()
    }
}
