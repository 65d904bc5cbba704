//! Cache key and reproducibility seed derivation

use cachet_config::OpenAiConfig;
use cachet_core::hash;
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::error::LlmError;
use crate::protocol::openai::ChatCompletionRequest;

/// Derives cache keys scoped to one client identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeyDeriver {
    base: String,
}

#[derive(Serialize)]
struct KeyInput<'a> {
    base: &'a str,
    request: &'a ChatCompletionRequest,
}

impl CacheKeyDeriver {
    /// Deriver with an explicit base identity
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// Base identity from configuration
    ///
    /// An explicit `cache_key` wins; otherwise the identity is hashed from
    /// the credential and endpoint so that different accounts never share
    /// entries.
    pub fn from_config(config: &OpenAiConfig) -> Self {
        if let Some(base) = &config.cache_key {
            return Self::new(base.clone());
        }

        let api_key = config.api_key.as_ref().map_or("", |key| key.expose_secret());
        let base_url = config.base_url.as_ref().map_or("", url::Url::as_str);
        Self::new(hash::id(&[api_key, base_url]))
    }

    /// Base identity mixed into every key
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Cache key for a wire request, covering every field it carries
    pub fn key(&self, request: &ChatCompletionRequest) -> Result<String, LlmError> {
        hash::encode(&KeyInput {
            base: &self.base,
            request,
        })
        .map_err(|e| LlmError::Internal(anyhow::anyhow!("failed to hash request for cache key: {e}")))
    }

    /// Reproducibility seed for a wire request
    ///
    /// Tool call ids are stripped first, so conversations that differ only
    /// in provider-assigned ids sample identically. The cache key keeps them.
    pub fn seed(request: &ChatCompletionRequest) -> Result<i64, LlmError> {
        let mut normalized = request.clone();
        for message in &mut normalized.messages {
            message.tool_call_id = None;
            for call in message.tool_calls.iter_mut().flatten() {
                call.id.clear();
            }
        }
        hash::seed(&normalized).map_err(|e| LlmError::Internal(anyhow::anyhow!("failed to hash request for seed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::protocol::openai::{ChatContent, ChatFunctionCall, ChatMessage, ChatToolCall};

    fn message(role: &str, text: &str) -> ChatMessage {
        ChatMessage {
            role: role.into(),
            content: Some(ChatContent::Text(text.into())),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    fn request_with_call_id(id: &str) -> ChatCompletionRequest {
        let mut assistant = message("assistant", "checking");
        assistant.tool_calls = Some(vec![ChatToolCall {
            index: Some(0),
            id: id.into(),
            tool_type: "function".into(),
            function: ChatFunctionCall {
                name: "lookup".into(),
                arguments: "{}".into(),
            },
        }]);
        let mut result = message("tool", "42");
        result.tool_call_id = Some(id.into());
        result.name = Some("lookup".into());

        ChatCompletionRequest {
            model: "gpt-4o".into(),
            messages: vec![message("user", "what is it?"), assistant, result],
            max_tokens: None,
            temperature: Some(0.0),
            response_format: None,
            tools: None,
            seed: None,
            user: None,
            stream: None,
        }
    }

    #[test]
    fn seed_ignores_tool_call_ids_but_key_does_not() {
        let deriver = CacheKeyDeriver::new("base");
        let a = request_with_call_id("call_a");
        let b = request_with_call_id("call_b");

        assert_eq!(CacheKeyDeriver::seed(&a).unwrap(), CacheKeyDeriver::seed(&b).unwrap());
        assert_ne!(deriver.key(&a).unwrap(), deriver.key(&b).unwrap());
    }

    #[test]
    fn seed_does_not_modify_the_request() {
        let request = request_with_call_id("call_a");
        let before = request.clone();
        let _ = CacheKeyDeriver::seed(&request).unwrap();
        assert_eq!(request, before);
    }

    #[test]
    fn key_depends_on_request_and_base() {
        let request = request_with_call_id("call_a");
        let deriver = CacheKeyDeriver::new("base");

        assert_eq!(deriver.key(&request).unwrap(), deriver.key(&request.clone()).unwrap());
        assert_ne!(deriver.key(&request).unwrap(), CacheKeyDeriver::new("other").key(&request).unwrap());

        let mut warmer = request.clone();
        warmer.temperature = Some(0.5);
        assert_ne!(deriver.key(&request).unwrap(), deriver.key(&warmer).unwrap());

        let mut seeded = request.clone();
        seeded.seed = Some(7);
        assert_ne!(deriver.key(&request).unwrap(), deriver.key(&seeded).unwrap());
    }

    #[test]
    fn base_prefers_configured_cache_key() {
        let config = OpenAiConfig {
            cache_key: Some("shared".into()),
            api_key: Some(SecretString::from("sk-test")),
            ..OpenAiConfig::default()
        };
        assert_eq!(CacheKeyDeriver::from_config(&config).base(), "shared");
    }

    #[test]
    fn derived_base_depends_on_credentials() {
        let a = OpenAiConfig {
            api_key: Some(SecretString::from("sk-a")),
            ..OpenAiConfig::default()
        };
        let b = OpenAiConfig {
            api_key: Some(SecretString::from("sk-b")),
            ..OpenAiConfig::default()
        };

        let base_a = CacheKeyDeriver::from_config(&a);
        assert_eq!(base_a.base().len(), hash::ID_LEN);
        assert_ne!(base_a, CacheKeyDeriver::from_config(&b));
    }
}
