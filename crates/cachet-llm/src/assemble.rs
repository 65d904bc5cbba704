//! Incremental folding of streamed chunks into one message
//!
//! Live streams and cache replays go through the same fold, one chunk at a
//! time, so both produce the same message for the same chunks.

use cachet_core::hash;

use crate::protocol::openai::{ChatCompletionChunk, ChunkDelta, ChunkToolCall};
use crate::types::{CompletionMessage, ContentPart, Role, ToolCall};

/// Prefix of ids assigned to tool calls the provider left unnamed
const BACKFILL_PREFIX: &str = "call_";

/// Hex characters of the content hash kept in a backfilled id
const BACKFILL_HASH_LEN: usize = 8;

/// Highest tool call slot a fragment may address
pub const MAX_TOOL_CALL_INDEX: u32 = 255;

/// Accumulates streamed deltas into a [`CompletionMessage`]
#[derive(Debug, Clone, Default)]
pub struct StreamAssembler {
    message: CompletionMessage,
}

impl StreamAssembler {
    /// Empty assembler
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the next chunk into the message
    ///
    /// Chunks without a choice are ignored.
    pub fn push(&mut self, chunk: &ChatCompletionChunk) {
        if let Some(delta) = chunk.delta() {
            self.fold(delta);
        }
    }

    /// Message folded so far, tool call ids not yet backfilled
    pub const fn message(&self) -> &CompletionMessage {
        &self.message
    }

    /// Finished message with missing tool call ids backfilled
    pub fn finish(self) -> CompletionMessage {
        let mut message = self.message;
        backfill_tool_call_ids(&mut message);
        message
    }

    fn fold(&mut self, delta: &ChunkDelta) {
        if let Some(raw) = delta.role.as_deref().filter(|role| !role.is_empty()) {
            match Role::parse(raw) {
                Some(role) => self.message.role = role,
                None => tracing::trace!(role = raw, "ignoring unknown role in delta"),
            }
        }

        for fragment in delta.tool_calls.iter().flatten() {
            self.fold_tool_call(fragment);
        }

        if let Some(text) = delta.content.as_deref().filter(|text| !text.is_empty()) {
            let existing = self.message.content.iter_mut().find_map(|part| match part {
                ContentPart::Text(existing) => Some(existing),
                ContentPart::ToolCall(_) => None,
            });

            match existing {
                Some(existing) => existing.push_str(text),
                None => self.message.content.push(ContentPart::Text(text.to_owned())),
            }
        }
    }

    /// Fold one tool call fragment into its slot
    ///
    /// Fragments address slots by their position among tool calls. Slots up
    /// to the addressed one are created on demand, so a fragment that arrives
    /// ahead of its siblings still lands in the right place. Fragments past
    /// [`MAX_TOOL_CALL_INDEX`] are dropped.
    fn fold_tool_call(&mut self, fragment: &ChunkToolCall) {
        let index = fragment.index.unwrap_or(0);
        if index > MAX_TOOL_CALL_INDEX {
            tracing::warn!(index, "dropping tool call fragment with out-of-range index");
            return;
        }
        let target = index as usize;

        let existing = self.message.tool_calls().count();
        for position in existing..=target {
            self.message.content.push(ContentPart::ToolCall(ToolCall {
                index: u32::try_from(position).ok(),
                ..ToolCall::default()
            }));
        }

        let Some(call) = self
            .message
            .content
            .iter_mut()
            .filter_map(ContentPart::as_tool_call_mut)
            .nth(target)
        else {
            return;
        };

        if fragment.index.is_some() {
            call.index = fragment.index;
        }
        if let Some(id) = fragment.id.as_deref().filter(|id| !id.is_empty()) {
            id.clone_into(&mut call.id);
        }
        if let Some(function) = &fragment.function {
            if let Some(name) = &function.name {
                call.function.name.push_str(name);
            }
            if let Some(arguments) = &function.arguments {
                call.function.arguments.push_str(arguments);
            }
        }
    }
}

/// Fold a complete chunk sequence and backfill tool call ids
pub fn assemble<'a>(chunks: impl IntoIterator<Item = &'a ChatCompletionChunk>) -> CompletionMessage {
    let mut assembler = StreamAssembler::new();
    for chunk in chunks {
        assembler.push(chunk);
    }
    assembler.finish()
}

/// Give every tool call without an id a deterministic one
///
/// The id hashes the function name and the fully accumulated arguments, so
/// the same call always gets the same id.
pub fn backfill_tool_call_ids(message: &mut CompletionMessage) {
    for call in message.content.iter_mut().filter_map(ContentPart::as_tool_call_mut) {
        if call.id.is_empty() {
            call.id = backfilled_id(call);
        }
    }
}

fn backfilled_id(call: &ToolCall) -> String {
    let digest = hash::id(&[call.function.name.as_str(), call.function.arguments.as_str()]);
    let short: String = digest.chars().take(BACKFILL_HASH_LEN).collect();
    format!("{BACKFILL_PREFIX}{short}")
}
