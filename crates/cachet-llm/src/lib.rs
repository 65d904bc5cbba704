//! Caching, streaming chat completion client
//!
//! Compiles provider-agnostic requests into the `OpenAI` chat completion
//! wire format, serves repeated requests from a compressed response cache,
//! and folds streamed deltas into a single message while reporting progress
//! to the caller.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod assemble;
pub mod cache_key;
pub mod client;
pub mod compile;
pub mod error;
pub mod protocol;
pub mod routing;
pub mod transport;
pub mod types;

pub use assemble::{StreamAssembler, assemble, backfill_tool_call_ids};
pub use cache_key::CacheKeyDeriver;
pub use client::{Client, WAITING_MESSAGE};
pub use compile::RequestCompiler;
pub use error::LlmError;
pub use routing::ModelRouter;
pub use transport::{ChunkStream, OpenAiTransport, Transport};
pub use types::{CompletionMessage, CompletionRequest, CompletionStatus, ContentPart, Role, StatusEvent, ToolCall};
