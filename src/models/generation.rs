use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{PromptError, Result};
use crate::models::GeminiModel;

const STUDIO_SYSTEM_INSTRUCTION: &str = "Act as a Prompt Enhancer AI that takes user-input prompts and transforms them into more engaging, detailed, and thought-provoking questions. Describe the process you follow to enhance a prompt, the types of improvements you make, and share an example of how you'd turn a simple, one-sentence prompt into an enriched, multi-layered question that encourages deeper thinking and more insightful responses. Output Format: {explanation: string, generated_prompt_for_generating_image: string}";

const REFINER_SYSTEM_INSTRUCTION: &str = r#"I am a Prompt Enhancer AI. Your goal is to optimize user prompts into highly detailed and effective instructions for Gemini, especially for image generation.

Process:

I will pinpoint the main subject/objective.
I will add environmental, temporal, and situational details.
I will specify viewpoint, angle, or narrative perspective.
I will set artistic style, tone, or aesthetic.
I will include specific attributes, textures, and sensory information.
I will refine exclusions or priorities.
I will refine the image generation prompt to use only one option per element, no ORs, and make it as specific as possible.

Finally, I will present the user with the enhanced image generation prompt, formatted as a descriptive paragraph without using action-oriented words like 'create' or 'generate'."#;

/// Shape of the JSON object the service is asked to reply with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSchema {
    pub prompt_field: &'static str,
    pub explanation_field: Option<&'static str>,
    pub prompt_required: bool,
}

impl ResponseSchema {
    /// Gemini `responseSchema` value for this shape.
    pub fn to_gemini_schema(&self) -> Value {
        let mut properties = Map::new();
        if let Some(explanation) = self.explanation_field {
            properties.insert(explanation.to_string(), json!({ "type": "STRING" }));
        }
        properties.insert(self.prompt_field.to_string(), json!({ "type": "STRING" }));

        let mut schema = json!({
            "type": "OBJECT",
            "properties": Value::Object(properties),
        });
        if self.prompt_required {
            schema["required"] = json!([self.prompt_field]);
        }
        schema
    }

    /// Parses the fully accumulated reply text.
    pub fn parse(&self, text: &str) -> Result<GenerationResult> {
        let value: Value = serde_json::from_str(text.trim())
            .map_err(|e| PromptError::MalformedResponse(format!("{} in {:?}", e, preview(text))))?;

        let raw = match value {
            Value::Object(map) => map,
            other => {
                return Err(PromptError::MalformedResponse(format!(
                    "expected a JSON object, got {}",
                    preview(&other.to_string())
                )))
            }
        };

        let field = |name: &str| raw.get(name).and_then(Value::as_str).map(String::from);
        let enhanced_prompt = field(self.prompt_field);
        let explanation = self.explanation_field.and_then(field);

        Ok(GenerationResult {
            enhanced_prompt,
            explanation,
            raw,
        })
    }
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 120;
    if text.chars().count() <= LIMIT {
        return text.to_string();
    }
    let truncated: String = text.chars().take(LIMIT).collect();
    format!("{}...", truncated)
}

/// System instruction and reply shape pairs the tool knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhancerProfile {
    #[default]
    Studio,
    Refiner,
}

impl EnhancerProfile {
    pub fn system_instruction(&self) -> &'static str {
        match self {
            EnhancerProfile::Studio => STUDIO_SYSTEM_INSTRUCTION,
            EnhancerProfile::Refiner => REFINER_SYSTEM_INSTRUCTION,
        }
    }

    pub fn schema(&self) -> ResponseSchema {
        match self {
            EnhancerProfile::Studio => ResponseSchema {
                prompt_field: "generated_prompt_for_generating_image",
                explanation_field: Some("explanation"),
                prompt_required: false,
            },
            EnhancerProfile::Refiner => ResponseSchema {
                prompt_field: "enhanced_prompt",
                explanation_field: Some("process"),
                prompt_required: true,
            },
        }
    }

    pub fn temperature(&self) -> Option<f32> {
        match self {
            EnhancerProfile::Studio => None,
            EnhancerProfile::Refiner => Some(0.1),
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "studio" => Ok(EnhancerProfile::Studio),
            "refiner" => Ok(EnhancerProfile::Refiner),
            other => Err(PromptError::ConfigError(format!(
                "Unknown enhancer profile '{}', expected 'studio' or 'refiner'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub user_prompt: String,
    pub model: GeminiModel,
    pub schema: ResponseSchema,
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    pub fn new(
        system_instruction: impl Into<String>,
        user_prompt: impl Into<String>,
        model: GeminiModel,
    ) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            user_prompt: user_prompt.into(),
            model,
            schema: EnhancerProfile::Studio.schema(),
            temperature: None,
        }
    }

    pub fn for_profile(profile: EnhancerProfile, user_prompt: impl Into<String>, model: GeminiModel) -> Self {
        Self {
            system_instruction: profile.system_instruction().to_string(),
            user_prompt: user_prompt.into(),
            model,
            schema: profile.schema(),
            temperature: profile.temperature(),
        }
    }

    pub fn with_schema(mut self, schema: ResponseSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub enhanced_prompt: Option<String>,
    pub explanation: Option<String>,
    pub raw: Map<String, Value>,
}

impl GenerationResult {
    /// The enhanced prompt, or `EmptyResponse` when it is missing or blank.
    pub fn require_prompt(&self) -> Result<&str> {
        self.enhanced_prompt
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                PromptError::EmptyResponse("the reply did not contain an enhanced prompt".into())
            })
    }
}
