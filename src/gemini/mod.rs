pub mod backend;
#[cfg(test)]
pub(crate) mod fake;
pub mod http;
pub mod sse;
pub mod text_client;

use std::sync::Arc;

use crate::{config::GeminiConfig, error::Result};

pub use backend::{ChunkStream, GenerationBackend};
pub use http::GeminiHttpBackend;
pub use text_client::TextClient;

#[derive(Clone)]
pub struct GeminiClient {
    text_client: TextClient,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let backend = GeminiHttpBackend::new(&config)?;
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    pub fn with_backend(config: GeminiConfig, backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            text_client: TextClient::new(backend, config),
        }
    }

    pub fn text(&self) -> &TextClient {
        &self.text_client
    }
}
