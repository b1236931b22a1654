//! Server-sent event decoding for `streamGenerateContent?alt=sse` replies.
//!
//! Bytes arrive in arbitrary network-sized pieces, so the decoder buffers
//! until a full line is available before decoding it as UTF-8.

use serde::Deserialize;

use crate::error::{PromptError, Result};
use crate::models::StreamChunk;

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data_lines: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds raw bytes and returns the data payload of every event completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();

        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(event) = self.handle_line(line) {
                events.push(event);
            }
        }

        events
    }

    /// Flushes whatever is left once the body has ended.
    pub fn finish(&mut self) -> Option<String> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest).trim_end_matches('\r').to_string();
            if let Some(event) = self.handle_line(&line) {
                return Some(event);
            }
        }
        self.take_event()
    }

    fn handle_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.take_event();
        }
        if let Some(data) = line.strip_prefix("data:") {
            let data = data.strip_prefix(' ').unwrap_or(data);
            self.data_lines.push(data.to_string());
        }
        // Comments, `event:`, `id:` and `retry:` lines carry nothing we use.
        None
    }

    fn take_event(&mut self) -> Option<String> {
        if self.data_lines.is_empty() {
            return None;
        }
        let data = self.data_lines.join("\n");
        self.data_lines.clear();
        Some(data)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiStreamResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    code: Option<u16>,
    message: Option<String>,
    status: Option<String>,
}

/// Decodes one event payload into the text fragment it carries.
pub fn parse_stream_chunk(data: &str) -> Result<StreamChunk> {
    let response: GeminiStreamResponse = serde_json::from_str(data).map_err(|e| {
        PromptError::MalformedResponse(format!("undecodable stream event: {}", e))
    })?;

    if let Some(error) = response.error {
        return Err(PromptError::ServiceError {
            status: error.code.unwrap_or(500),
            message: error
                .message
                .or(error.status)
                .unwrap_or_else(|| "unknown error".to_string()),
        });
    }

    let candidate = response.candidates.and_then(|c| c.into_iter().next());
    let Some(candidate) = candidate else {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(PromptError::EmptyResponse(format!(
                "the prompt was blocked ({})",
                reason
            )));
        }
        return Ok(StreamChunk {
            chunk: String::new(),
            done: false,
            finish_reason: None,
        });
    };

    let chunk = candidate
        .content
        .and_then(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|part| !part.thought)
        .filter_map(|part| part.text)
        .collect::<String>();

    let finish_reason = candidate.finish_reason.filter(|reason| !reason.is_empty());

    Ok(StreamChunk {
        chunk,
        done: finish_reason.is_some(),
        finish_reason,
    })
}
