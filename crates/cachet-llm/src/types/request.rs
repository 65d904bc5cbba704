use serde::{Deserialize, Serialize};

use super::message::CompletionMessage;

/// Provider-agnostic completion request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier; empty selects the configured default
    #[serde(default)]
    pub model: String,
    /// Conversation messages
    #[serde(default)]
    pub messages: Vec<CompletionMessage>,
    /// Tool definitions available to the model
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    /// Sampling temperature; unset compiles to zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Ask the model for a JSON object response
    #[serde(default)]
    pub json_response: bool,
    /// Per-request cache switch; unset follows the client default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,
    /// Per-request seed switch; unset follows the client default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_seed: Option<bool>,
    /// Whether to prepend the built-in system prompt (default on)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_system_prompt: Option<bool>,
}

/// Definition of a tool the model can call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Function specification
    pub function: FunctionDefinition,
}

/// Specification of a callable function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the function parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}
