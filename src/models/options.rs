use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PromptError, Result};
use crate::models::GeminiModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    Square,
    Portrait,
    Landscape,
    Cinematic,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 4] = [
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Landscape,
        AspectRatio::Cinematic,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Square => "Square (1:1)",
            AspectRatio::Portrait => "Portrait (3:4)",
            AspectRatio::Landscape => "Landscape (16:9)",
            AspectRatio::Cinematic => "Cinematic (21:9)",
        }
    }

    pub fn ratio(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Cinematic => "21:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AspectRatio {
    type Err = PromptError;

    /// Accepts the full label ("Landscape (16:9)"), the bare name or the ratio.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        AspectRatio::ALL
            .iter()
            .copied()
            .find(|ratio| {
                ratio.label().eq_ignore_ascii_case(wanted)
                    || ratio.ratio() == wanted
                    || ratio
                        .label()
                        .split_whitespace()
                        .next()
                        .is_some_and(|name| name.eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| PromptError::ValidationError(format!("Unknown aspect ratio: {}", wanted)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Look {
    Photorealistic,
    Styled(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedOptions {
    pub resolution_4k: bool,
    pub bokeh: bool,
    pub aspect_ratio: Option<AspectRatio>,
    pub extra_requirements: Option<String>,
}

/// A fully validated set of options for one prompt composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet {
    description: String,
    look: Look,
    background_color: Option<String>,
    advanced: Option<AdvancedOptions>,
    model: GeminiModel,
}

impl OptionSet {
    pub fn builder(description: impl Into<String>) -> OptionSetBuilder {
        OptionSetBuilder::new(description)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn look(&self) -> &Look {
        &self.look
    }

    pub fn is_photorealistic(&self) -> bool {
        self.look == Look::Photorealistic
    }

    pub fn background_color(&self) -> Option<&str> {
        self.background_color.as_deref()
    }

    pub fn advanced(&self) -> Option<&AdvancedOptions> {
        self.advanced.as_ref()
    }

    pub fn model(&self) -> GeminiModel {
        self.model
    }
}

#[derive(Debug, Clone)]
pub struct OptionSetBuilder {
    description: String,
    photorealistic: bool,
    style: Option<String>,
    background_color: Option<String>,
    advanced: Option<AdvancedOptions>,
    model: GeminiModel,
}

impl OptionSetBuilder {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            photorealistic: false,
            style: None,
            background_color: None,
            advanced: None,
            model: GeminiModel::default(),
        }
    }

    pub fn photorealistic(mut self, enabled: bool) -> Self {
        self.photorealistic = enabled;
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    pub fn with_advanced(mut self, advanced: AdvancedOptions) -> Self {
        self.advanced = Some(advanced);
        self
    }

    pub fn with_model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    pub fn build(self) -> Result<OptionSet> {
        let description = self.description.trim().to_string();
        if description.is_empty() {
            return Err(PromptError::ValidationError(
                "Please enter an image description.".into(),
            ));
        }

        if self.photorealistic {
            return Ok(OptionSet {
                description,
                look: Look::Photorealistic,
                background_color: None,
                advanced: None,
                model: self.model,
            });
        }

        let style = self
            .style
            .map(|style| style.trim().to_string())
            .filter(|style| !style.is_empty())
            .ok_or_else(|| PromptError::ValidationError("Please choose a style.".into()))?;

        let background_color = self
            .background_color
            .map(|color| color.trim().to_string())
            .filter(|color| !color.is_empty());

        let advanced = self.advanced.map(|mut advanced| {
            advanced.extra_requirements = advanced
                .extra_requirements
                .map(|extra| extra.trim().to_string())
                .filter(|extra| !extra.is_empty());
            advanced
        });

        Ok(OptionSet {
            description,
            look: Look::Styled(style),
            background_color,
            advanced,
            model: self.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_description_is_rejected() {
        let err = OptionSet::builder("   ")
            .with_style("Watercolor")
            .build()
            .unwrap_err();
        assert!(matches!(err, PromptError::ValidationError(_)));
    }

    #[test]
    fn test_style_required_unless_photorealistic() {
        let err = OptionSet::builder("a cat").build().unwrap_err();
        assert!(matches!(err, PromptError::ValidationError(_)));

        let options = OptionSet::builder("a cat").photorealistic(true).build().unwrap();
        assert!(options.is_photorealistic());
    }

    #[test]
    fn test_photorealistic_drops_other_fields() {
        let options = OptionSet::builder("  a cat  ")
            .photorealistic(true)
            .with_style("Watercolor")
            .with_background_color("#000000")
            .with_advanced(AdvancedOptions {
                bokeh: true,
                ..Default::default()
            })
            .build()
            .unwrap();

        assert_eq!(options.description(), "a cat");
        assert_eq!(options.background_color(), None);
        assert!(options.advanced().is_none());
    }

    #[test]
    fn test_blank_extra_requirements_become_none() {
        let options = OptionSet::builder("a cat")
            .with_style("Watercolor")
            .with_advanced(AdvancedOptions {
                extra_requirements: Some("   ".into()),
                ..Default::default()
            })
            .build()
            .unwrap();

        assert_eq!(options.advanced().unwrap().extra_requirements, None);
    }

    #[test]
    fn test_aspect_ratio_parsing() {
        assert_eq!("Landscape (16:9)".parse::<AspectRatio>().unwrap(), AspectRatio::Landscape);
        assert_eq!("21:9".parse::<AspectRatio>().unwrap(), AspectRatio::Cinematic);
        assert_eq!("portrait".parse::<AspectRatio>().unwrap(), AspectRatio::Portrait);
        assert!("panorama".parse::<AspectRatio>().is_err());
    }
}
