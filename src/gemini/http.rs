use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde_json::{json, Map, Value};
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    config::GeminiConfig,
    error::{PromptError, Result},
    gemini::{
        backend::{ChunkStream, GenerationBackend},
        sse::{parse_stream_chunk, SseDecoder},
    },
    models::GenerationRequest,
};

pub struct GeminiHttpBackend {
    client: Client,
    base_url: String,
}

impl GeminiHttpBackend {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PromptError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn stream_url(&self, request: &GenerationRequest) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url,
            request.model.id()
        )
    }
}

pub fn build_request_payload(request: &GenerationRequest) -> Value {
    let mut generation_config = Map::new();
    generation_config.insert("responseMimeType".into(), json!("application/json"));
    generation_config.insert("responseSchema".into(), request.schema.to_gemini_schema());
    if let Some(temperature) = request.temperature {
        generation_config.insert("temperature".into(), json!(temperature));
    }

    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.user_prompt }]
        }],
        "systemInstruction": {
            "parts": [{ "text": request.system_instruction }]
        },
        "generationConfig": Value::Object(generation_config),
    })
}

/// Pulls a readable message out of a Gemini error body.
pub fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let Some(message) = value
            .pointer("/error/message")
            .or_else(|| value.get("message"))
            .and_then(Value::as_str)
        {
            return message.to_string();
        }
    }

    trimmed.chars().take(500).collect()
}

#[async_trait]
impl GenerationBackend for GeminiHttpBackend {
    async fn stream(&self, api_key: &str, request: &GenerationRequest) -> Result<ChunkStream> {
        let payload = build_request_payload(request);
        let url = self.stream_url(request);

        log::info!("Invoking streaming model: {}", request.model);
        log::debug!(
            "Gemini request: prompt {} chars, system instruction {} chars, schema {}",
            request.user_prompt.len(),
            request.system_instruction.len(),
            payload["generationConfig"]["responseSchema"]
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                log::error!(
                    "Gemini request failed to send (timeout={}, connect={}): {}",
                    e.is_timeout(),
                    e.is_connect(),
                    e
                );
                PromptError::RequestError(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = summarize_error_body(&body);
            log::error!("Gemini API error: status={}, message={}", status, message);
            return Err(PromptError::ServiceError {
                status: status.as_u16(),
                message,
            });
        }

        let (tx, rx) = tokio::sync::mpsc::channel(100);
        let mut body = Box::pin(response.bytes_stream());

        tokio::spawn(async move {
            let mut decoder = SseDecoder::new();

            while let Some(bytes) = body.next().await {
                let bytes = match bytes {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx
                            .send(Err(PromptError::RequestError(format!(
                                "Gemini stream interrupted: {}",
                                e
                            ))))
                            .await;
                        return;
                    }
                };

                for event in decoder.push(&bytes) {
                    if tx.send(parse_stream_chunk(&event)).await.is_err() {
                        return;
                    }
                }
            }

            if let Some(event) = decoder.finish() {
                let _ = tx.send(parse_stream_chunk(&event)).await;
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    fn name(&self) -> &'static str {
        "gemini-http"
    }
}
