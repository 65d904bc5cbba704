//! Transport trait and the `OpenAI`-compatible implementation

pub mod openai;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::error::LlmError;
use crate::protocol::openai::{ChatCompletionChunk, ChatCompletionRequest};

pub use openai::OpenAiTransport;

/// Ordered chunks of one streamed completion, ending at end-of-stream
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk, LlmError>> + Send>>;

/// Connection to a chat completion API
#[async_trait]
pub trait Transport: Send + Sync {
    /// Human-readable transport name, used in logs
    fn name(&self) -> &str;

    /// Identifiers of every model the endpoint serves
    async fn list_models(&self) -> Result<Vec<String>, LlmError>;

    /// Open a streamed completion
    ///
    /// Fails with [`LlmError::Upstream`] when the stream cannot be opened;
    /// failures after that surface as [`LlmError::Streaming`] items.
    async fn create_chat_completion_stream(&self, request: &ChatCompletionRequest) -> Result<ChunkStream, LlmError>;
}
