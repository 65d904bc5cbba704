//! Conversion from provider-agnostic requests to the chat completion wire format

use crate::error::LlmError;
use crate::protocol::openai::{
    ChatCompletionRequest, ChatContent, ChatContentPart, ChatFunction, ChatFunctionCall, ChatMessage, ChatTool,
    ChatToolCall, ResponseFormat,
};
use crate::types::{CompletionMessage, CompletionRequest, ContentPart, Role, ToolCall, ToolDefinition};

/// Built-in system prompt prepended unless the request opts out
pub const INTERNAL_SYSTEM_PROMPT: &str = "You are a task-oriented assistant. \
Answer precisely and concisely. When tools are available, call them with valid JSON \
arguments instead of describing what you would do. Do not invent tool results.";

/// Texts that stand for an intentionally empty message and are never sent
const EMPTY_PLACEHOLDERS: [&str; 2] = [".", "{}"];

/// Compiles [`CompletionRequest`]s into wire requests
#[derive(Debug, Clone)]
pub struct RequestCompiler {
    default_model: String,
    user: Option<String>,
}

impl RequestCompiler {
    /// Create a compiler filling empty models with `default_model`
    pub fn new(default_model: impl Into<String>, user: Option<String>) -> Self {
        Self {
            default_model: default_model.into(),
            user,
        }
    }

    /// Model used when a request leaves it empty
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Compile a request into its wire form
    ///
    /// The result never carries a seed and is not marked as streaming;
    /// both are decided later by the caller.
    pub fn compile(&self, request: &CompletionRequest) -> Result<ChatCompletionRequest, LlmError> {
        let messages = compile_messages(request);
        if messages.is_empty() {
            return Err(LlmError::MalformedRequest("no messages to send".to_owned()));
        }

        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        let tools = (!request.tools.is_empty()).then(|| request.tools.iter().map(compile_tool).collect());

        Ok(ChatCompletionRequest {
            model,
            messages,
            max_tokens: request.max_tokens,
            temperature: Some(request.temperature.unwrap_or(0.0)),
            response_format: request.json_response.then(ResponseFormat::json_object),
            tools,
            seed: None,
            user: self.user.clone(),
            stream: None,
        })
    }
}

/// Hoist system turns into one leading system message, then convert each turn
///
/// A system message is hoisted only when another system or user message
/// follows it. Anything else is sent as a user message, since providers
/// reject trailing or orphan system turns.
fn compile_messages(request: &CompletionRequest) -> Vec<ChatMessage> {
    let mut system_prompts = Vec::new();
    if request.internal_system_prompt.unwrap_or(true) {
        system_prompts.push(INTERNAL_SYSTEM_PROMPT.to_owned());
    }

    let mut turns = Vec::with_capacity(request.messages.len());
    for (i, message) in request.messages.iter().enumerate() {
        if message.role != Role::System {
            turns.push((message.role, message));
            continue;
        }

        let hoist = request
            .messages
            .get(i + 1)
            .is_some_and(|next| matches!(next.role, Role::System | Role::User));
        if hoist {
            system_prompts.push(message.text_content());
        } else {
            turns.push((Role::User, message));
        }
    }

    let system = (!system_prompts.is_empty()).then(|| CompletionMessage::text(Role::System, system_prompts.join("\n")));

    system
        .iter()
        .map(|message| (Role::System, message))
        .chain(turns)
        .filter_map(|(role, message)| compile_message(role, message))
        .collect()
}

/// Convert one message, or `None` when it is an empty placeholder
fn compile_message(role: Role, message: &CompletionMessage) -> Option<ChatMessage> {
    let mut wire = ChatMessage {
        role: role.as_str().to_owned(),
        content: None,
        name: None,
        tool_calls: None,
        tool_call_id: None,
    };

    // Azure expects the tool name alongside the id it answers
    if let Some(call) = &message.tool_call {
        wire.tool_call_id = Some(call.id.clone());
        wire.name = Some(call.function.name.clone());
    }

    let mut texts = Vec::new();
    let mut tool_calls = Vec::new();
    for part in &message.content {
        match part {
            ContentPart::ToolCall(call) => tool_calls.push(compile_tool_call(call)),
            ContentPart::Text(text) if !text.is_empty() => texts.push(text.clone()),
            ContentPart::Text(_) => {}
        }
    }

    if !tool_calls.is_empty() {
        wire.tool_calls = Some(tool_calls);
    }

    match texts.len() {
        0 => {}
        1 => {
            let text = texts.swap_remove(0);
            if EMPTY_PLACEHOLDERS.contains(&text.as_str()) {
                return None;
            }
            wire.content = Some(ChatContent::Text(text));
        }
        _ => {
            let parts = texts.into_iter().map(|text| ChatContentPart::Text { text }).collect();
            wire.content = Some(ChatContent::Parts(parts));
        }
    }

    Some(wire)
}

fn compile_tool_call(call: &ToolCall) -> ChatToolCall {
    ChatToolCall {
        index: call.index,
        id: call.id.clone(),
        tool_type: "function".to_owned(),
        function: ChatFunctionCall {
            name: call.function.name.clone(),
            arguments: call.function.arguments.clone(),
        },
    }
}

fn compile_tool(tool: &ToolDefinition) -> ChatTool {
    ChatTool {
        tool_type: "function".to_owned(),
        function: ChatFunction {
            name: tool.function.name.clone(),
            description: tool.function.description.clone(),
            parameters: tool.function.parameters.clone(),
        },
    }
}
