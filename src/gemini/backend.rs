use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::Stream;

use crate::{error::Result, models::GenerationRequest, models::StreamChunk};

pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

/// Something that can turn a generation request into a stream of text
/// fragments. The HTTP implementation talks to Gemini; tests plug in a
/// scripted one.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn stream(&self, api_key: &str, request: &GenerationRequest) -> Result<ChunkStream>;

    fn name(&self) -> &'static str;
}
