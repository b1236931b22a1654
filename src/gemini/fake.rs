//! Scripted backend for tests: replays fixed fragments instead of calling Gemini.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    error::{PromptError, Result},
    gemini::backend::{ChunkStream, GenerationBackend},
    models::{GenerationRequest, StreamChunk},
};

#[derive(Debug, Clone)]
enum Script {
    Fragments(Vec<String>),
    /// Fragments followed by a transport failure mid-stream.
    BrokenStream(Vec<String>, String),
    RequestError(String),
}

#[derive(Debug)]
pub struct FakeBackend {
    script: Script,
    calls: AtomicUsize,
    last_request: Mutex<Option<(String, String, String)>>,
}

impl FakeBackend {
    pub fn with_fragments(fragments: &[&str]) -> Self {
        Self::from_script(Script::Fragments(
            fragments.iter().map(|f| f.to_string()).collect(),
        ))
    }

    pub fn with_reply(json: &str) -> Self {
        let mid = json.len() / 2;
        let split = (mid..json.len()).find(|i| json.is_char_boundary(*i)).unwrap_or(mid);
        let (a, b) = json.split_at(split);
        Self::with_fragments(&[a, b])
    }

    pub fn with_broken_stream(fragments: &[&str], message: &str) -> Self {
        Self::from_script(Script::BrokenStream(
            fragments.iter().map(|f| f.to_string()).collect(),
            message.to_string(),
        ))
    }

    pub fn with_request_error(message: &str) -> Self {
        Self::from_script(Script::RequestError(message.to_string()))
    }

    fn from_script(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(api_key, system_instruction, user_prompt)` of the most recent call.
    pub fn last_request(&self) -> Option<(String, String, String)> {
        self.last_request.lock().ok().and_then(|guard| guard.clone())
    }
}

fn text_chunk(text: String, last: bool) -> Result<StreamChunk> {
    Ok(StreamChunk {
        chunk: text,
        done: last,
        finish_reason: last.then(|| "STOP".to_string()),
    })
}

#[async_trait]
impl GenerationBackend for FakeBackend {
    async fn stream(&self, api_key: &str, request: &GenerationRequest) -> Result<ChunkStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some((
                api_key.to_string(),
                request.system_instruction.clone(),
                request.user_prompt.clone(),
            ));
        }

        let items: Vec<Result<StreamChunk>> = match &self.script {
            Script::RequestError(message) => {
                return Err(PromptError::RequestError(message.clone()))
            }
            Script::Fragments(fragments) => {
                let count = fragments.len();
                fragments
                    .iter()
                    .enumerate()
                    .map(|(i, f)| text_chunk(f.clone(), i + 1 == count))
                    .collect()
            }
            Script::BrokenStream(fragments, message) => fragments
                .iter()
                .map(|f| text_chunk(f.clone(), false))
                .chain(std::iter::once(Err(PromptError::RequestError(
                    message.clone(),
                ))))
                .collect(),
        };

        Ok(Box::pin(futures::stream::iter(items)))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
