use serde::{Deserialize, Serialize};

/// Role of a message participant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction
    System,
    /// User message
    User,
    /// Assistant response
    #[default]
    Assistant,
    /// Tool/function result
    Tool,
}

impl Role {
    /// Wire name of the role
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }

    /// Parse a wire role name
    pub fn parse(role: &str) -> Option<Self> {
        match role {
            "system" => Some(Self::System),
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            "tool" => Some(Self::Tool),
            _ => None,
        }
    }
}

/// A tool/function call requested by the assistant
///
/// While a response streams in, `function.name` and `function.arguments`
/// grow by appending fragments; they are never replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Position among the tool calls of a message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    /// Provider-assigned (or backfilled) identifier
    #[serde(default)]
    pub id: String,
    /// Function name and arguments
    #[serde(default)]
    pub function: FunctionCall,
}

/// Function name and arguments within a tool call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name
    #[serde(default)]
    pub name: String,
    /// JSON-encoded arguments
    #[serde(default)]
    pub arguments: String,
}

/// Individual part of a message: free text or a tool call, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentPart {
    /// Text content block
    Text(String),
    /// Tool call reference
    ToolCall(ToolCall),
}

impl ContentPart {
    /// Text of a text part
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::ToolCall(_) => None,
        }
    }

    /// Tool call of a tool call part
    pub const fn as_tool_call(&self) -> Option<&ToolCall> {
        match self {
            Self::ToolCall(call) => Some(call),
            Self::Text(_) => None,
        }
    }

    /// Mutable tool call of a tool call part
    pub const fn as_tool_call_mut(&mut self) -> Option<&mut ToolCall> {
        match self {
            Self::ToolCall(call) => Some(call),
            Self::Text(_) => None,
        }
    }
}

/// A role plus ordered content
///
/// Adjacent text parts are always merged into one; use [`CompletionMessage::push`]
/// or the constructors to keep that true.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMessage {
    /// Role of the message author
    #[serde(default)]
    pub role: Role,
    /// Ordered content parts
    #[serde(default)]
    pub content: Vec<ContentPart>,
    /// Tool call this message answers (tool results only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCall>,
}

impl CompletionMessage {
    /// Build a message, merging adjacent text parts
    pub fn new(role: Role, content: impl IntoIterator<Item = ContentPart>) -> Self {
        let mut message = Self {
            role,
            content: Vec::new(),
            tool_call: None,
        };
        for part in content {
            message.push(part);
        }
        message
    }

    /// Single text part message
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self::new(role, [ContentPart::Text(text.into())])
    }

    /// Tool result answering `call`
    pub fn tool_result(call: ToolCall, output: impl Into<String>) -> Self {
        Self {
            tool_call: Some(call),
            ..Self::text(Role::Tool, output)
        }
    }

    /// Append a part, merging it into a preceding text part when both are text
    pub fn push(&mut self, part: ContentPart) {
        if let ContentPart::Text(text) = &part
            && let Some(ContentPart::Text(last)) = self.content.last_mut()
        {
            last.push_str(text);
            return;
        }
        self.content.push(part);
    }

    /// All text parts concatenated
    pub fn text_content(&self) -> String {
        self.content.iter().filter_map(ContentPart::as_text).collect()
    }

    /// Tool calls in content order
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.content.iter().filter_map(ContentPart::as_tool_call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_text_parts_merge() {
        let message = CompletionMessage::new(
            Role::User,
            [
                ContentPart::Text("Hello, ".into()),
                ContentPart::Text("world".into()),
            ],
        );
        assert_eq!(message.content, vec![ContentPart::Text("Hello, world".into())]);
    }

    #[test]
    fn tool_call_separates_text_parts() {
        let message = CompletionMessage::new(
            Role::Assistant,
            [
                ContentPart::Text("a".into()),
                ContentPart::ToolCall(ToolCall::default()),
                ContentPart::Text("b".into()),
            ],
        );
        assert_eq!(message.content.len(), 3);
        assert_eq!(message.text_content(), "ab");
        assert_eq!(message.tool_calls().count(), 1);
    }

    #[test]
    fn tool_result_carries_call() {
        let call = ToolCall {
            id: "call_1".into(),
            ..ToolCall::default()
        };
        let message = CompletionMessage::tool_result(call, "42");
        assert_eq!(message.role, Role::Tool);
        assert_eq!(message.tool_call.as_ref().unwrap().id, "call_1");
        assert_eq!(message.text_content(), "42");
    }

    #[test]
    fn role_round_trips_wire_names() {
        for role in [Role::System, Role::User, Role::Assistant, Role::Tool] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("developer"), None);
    }
}
