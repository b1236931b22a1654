use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Service error ({status}): {message}")]
    ServiceError { status: u16, message: String },
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Empty response: {0}")]
    EmptyResponse(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PromptError {
    /// True for failures that happened after the prompt was handed to the
    /// generation service, as opposed to bad input or setup.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            PromptError::RequestError(_)
                | PromptError::ServiceError { .. }
                | PromptError::MalformedResponse(_)
                | PromptError::EmptyResponse(_)
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            PromptError::ValidationError(msg) => format!("⚠️ {}", msg),
            PromptError::ConfigError(msg) => format!("Configuration problem: {}", msg),
            PromptError::EmptyResponse(_) => {
                "Failed to generate a prompt. Please try again.".to_string()
            }
            other => format!("Error generating prompt: {}", other),
        }
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PromptError>;
