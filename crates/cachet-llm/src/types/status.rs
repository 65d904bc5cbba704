use super::message::CompletionMessage;
use crate::protocol::openai::{ChatCompletionChunk, ChatCompletionRequest};

/// Progress event pushed to the caller's status sink
///
/// Every event of one call carries the same `completion_id`.
#[derive(Debug, Clone)]
pub struct CompletionStatus {
    /// Per-call transaction id, unique for the client's lifetime
    pub completion_id: String,
    /// What happened
    pub event: StatusEvent,
}

/// Stage of a completion call
#[derive(Debug, Clone)]
pub enum StatusEvent {
    /// The request compiled and is about to be served
    Submitted {
        /// Compiled wire request
        request: Box<ChatCompletionRequest>,
    },
    /// The response so far
    Partial {
        /// Message folded from the chunks received so far
        message: CompletionMessage,
    },
    /// The call finished
    Final {
        /// Every chunk of the response, in arrival order
        chunks: Vec<ChatCompletionChunk>,
        /// Fully assembled message with tool call ids backfilled
        message: CompletionMessage,
        /// Whether the chunks were replayed from the cache
        cached: bool,
    },
}

impl CompletionStatus {
    /// Partial message, if this is a partial event
    pub const fn partial(&self) -> Option<&CompletionMessage> {
        match &self.event {
            StatusEvent::Partial { message } => Some(message),
            _ => None,
        }
    }

    /// Whether this is the final event of a call
    pub const fn is_final(&self) -> bool {
        matches!(self.event, StatusEvent::Final { .. })
    }
}
