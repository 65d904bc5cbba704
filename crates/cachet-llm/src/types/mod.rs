//! Provider-agnostic request, message, and status types
//!
//! Callers build [`CompletionRequest`]s and receive [`CompletionMessage`]s;
//! the wire representation lives in [`crate::protocol`].

pub mod message;
pub mod request;
pub mod status;

pub use message::{CompletionMessage, ContentPart, FunctionCall, Role, ToolCall};
pub use request::{CompletionRequest, FunctionDefinition, ToolDefinition};
pub use status::{CompletionStatus, StatusEvent};
