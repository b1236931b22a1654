use std::sync::Arc;

use futures::StreamExt;

use crate::{
    config::GeminiConfig,
    error::Result,
    gemini::backend::{ChunkStream, GenerationBackend},
    logger,
    models::{GeminiModel, GenerationRequest, GenerationResult},
};

#[derive(Clone)]
pub struct TextClient {
    backend: Arc<dyn GenerationBackend>,
    config: GeminiConfig,
}

impl TextClient {
    pub fn new(backend: Arc<dyn GenerationBackend>, config: GeminiConfig) -> Self {
        Self { backend, config }
    }

    pub fn supported_models() -> Vec<(&'static str, &'static str, &'static str)> {
        GeminiModel::ALL
            .iter()
            .map(|model| (model.id(), model.display_name(), "Google"))
            .collect()
    }

    /// Sends `user_prompt` with `system_instruction` and returns the parsed
    /// JSON reply. The whole stream is drained before anything is parsed.
    ///
    /// The reply is requested and read with the Studio schema, so the
    /// enhanced prompt comes from `generated_prompt_for_generating_image` and
    /// the explanation from `explanation` whatever the instruction says. Use
    /// [`TextClient::generate_request`] with a [`GenerationRequest`] built via
    /// `for_profile` or `with_schema` to read other fields.
    pub async fn generate(
        &self,
        system_instruction: &str,
        user_prompt: &str,
        model: GeminiModel,
    ) -> Result<GenerationResult> {
        self.generate_request(GenerationRequest::new(system_instruction, user_prompt, model))
            .await
    }

    pub async fn generate_request(&self, request: GenerationRequest) -> Result<GenerationResult> {
        let _timer = logger::timer(&format!("generate with {}", request.model));
        let mut stream = self.generate_stream(&request).await?;

        let mut full_response = String::new();
        let mut chunk_count = 0usize;
        let mut finish_reason = None;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if !chunk.chunk.is_empty() {
                full_response.push_str(&chunk.chunk);
                chunk_count += 1;
            }
            if chunk.finish_reason.is_some() {
                finish_reason = chunk.finish_reason;
            }
        }

        log::debug!(
            "Received {} chunks ({} characters), finish reason: {}",
            chunk_count,
            full_response.len(),
            finish_reason.as_deref().unwrap_or("none")
        );

        request.schema.parse(&full_response)
    }

    /// Raw fragment stream. The API key is resolved here, so a missing key
    /// fails before any request is sent.
    pub async fn generate_stream(&self, request: &GenerationRequest) -> Result<ChunkStream> {
        let api_key = self.config.resolve_api_key()?;
        log::debug!("Using {} backend", self.backend.name());
        self.backend.stream(&api_key, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PromptError;
    use crate::gemini::fake::FakeBackend;
    use crate::models::EnhancerProfile;

    fn client(backend: Arc<FakeBackend>) -> TextClient {
        TextClient::new(backend, GeminiConfig::new().with_api_key("test-key"))
    }

    #[tokio::test]
    async fn test_fragments_are_concatenated_before_parsing() {
        let backend = Arc::new(FakeBackend::with_fragments(&[
            "{\"explanation\": \"more detail\", ",
            "\"generated_prompt_for_generating_image\": ",
            "\"A red fox in fresh snow.\"}",
        ]));
        let result = client(backend.clone())
            .generate("system", "Generate an image of a fox, styled as Anime.", GeminiModel::default())
            .await
            .unwrap();

        assert_eq!(result.require_prompt().unwrap(), "A red fox in fresh snow.");
        assert_eq!(result.explanation.as_deref(), Some("more detail"));

        let (key, system, prompt) = backend.last_request().unwrap();
        assert_eq!(key, "test-key");
        assert_eq!(system, "system");
        assert_eq!(prompt, "Generate an image of a fox, styled as Anime.");
    }

    #[tokio::test]
    async fn test_malformed_stream_is_an_error() {
        let backend = Arc::new(FakeBackend::with_fragments(&["Here is ", "your prompt!"]));
        let err = client(backend)
            .generate("system", "prompt", GeminiModel::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PromptError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_empty_stream_is_malformed_not_empty_success() {
        let backend = Arc::new(FakeBackend::with_fragments(&[]));
        let err = client(backend)
            .generate("system", "prompt", GeminiModel::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PromptError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let backend = Arc::new(FakeBackend::with_reply("{}"));
        let config = GeminiConfig::new().with_api_key_env("RGENPROMPT_TEST_NO_SUCH_KEY");
        let err = TextClient::new(backend.clone(), config)
            .generate("system", "prompt", GeminiModel::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PromptError::ConfigError(_)));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let backend = Arc::new(FakeBackend::with_request_error("connection refused"));
        let err = client(backend)
            .generate("system", "prompt", GeminiModel::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PromptError::RequestError(_)));

        let backend = Arc::new(FakeBackend::with_broken_stream(&["{\"enh"], "reset by peer"));
        let err = client(backend)
            .generate("system", "prompt", GeminiModel::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PromptError::RequestError(_)));
    }

    #[tokio::test]
    async fn test_profile_request_uses_profile_schema() {
        let backend = Arc::new(FakeBackend::with_reply(
            r#"{"process": "pinpointed the subject", "enhanced_prompt": "A lone fox."}"#,
        ));
        let request =
            GenerationRequest::for_profile(EnhancerProfile::Refiner, "a fox", GeminiModel::default());
        let result = client(backend.clone()).generate_request(request).await.unwrap();

        assert_eq!(result.require_prompt().unwrap(), "A lone fox.");
        assert_eq!(result.explanation.as_deref(), Some("pinpointed the subject"));
        let (_, system, _) = backend.last_request().unwrap();
        assert_eq!(system, EnhancerProfile::Refiner.system_instruction());
    }

    #[tokio::test]
    async fn test_generate_reads_studio_fields_only() {
        let backend = Arc::new(FakeBackend::with_reply(
            r#"{"process": "pinpointed the subject", "enhanced_prompt": "A lone fox."}"#,
        ));
        let result = client(backend)
            .generate("custom instruction", "a fox", GeminiModel::default())
            .await
            .unwrap();

        assert_eq!(result.enhanced_prompt, None);
        assert_eq!(result.explanation, None);
        assert_eq!(result.raw["enhanced_prompt"], "A lone fox.");
        assert!(matches!(
            result.require_prompt(),
            Err(PromptError::EmptyResponse(_))
        ));
    }

    #[test]
    fn test_supported_models() {
        let models = TextClient::supported_models();
        assert_eq!(models.len(), 3);
        assert_eq!(models[0].0, "gemini-2.5-flash-preview-05-20");
    }
}
