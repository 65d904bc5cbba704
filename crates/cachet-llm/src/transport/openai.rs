//! OpenAI-compatible transport, including Azure deployments

use std::future;

use async_trait::async_trait;
use cachet_config::{ApiType, OpenAiConfig};
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::{ChunkStream, Transport};
use crate::error::LlmError;
use crate::protocol::openai::{ChatCompletionChunk, ChatCompletionRequest, ErrorResponse, ModelList};
use crate::routing::ModelRouter;

/// Default `OpenAI` API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Terminal SSE payload
const DONE_MARKER: &str = "[DONE]";

/// OpenAI-compatible transport
pub struct OpenAiTransport {
    client: Client,
    base_url: Url,
    api_type: ApiType,
    api_key: Option<SecretString>,
    api_version: Option<String>,
    org_id: Option<String>,
    router: ModelRouter,
}

impl OpenAiTransport {
    /// Create from the resolved configuration
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Internal` if the default base URL cannot be parsed
    pub fn new(config: &OpenAiConfig) -> Result<Self, LlmError> {
        let base_url = match &config.base_url {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_BASE_URL).map_err(|e| anyhow::anyhow!("invalid default base URL: {e}"))?,
        };

        Ok(Self {
            client: Client::new(),
            base_url,
            api_type: config.api_type,
            api_key: config.api_key.clone(),
            api_version: config.effective_api_version().map(str::to_owned),
            org_id: config.org_id.clone(),
            router: ModelRouter::from_config(config),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, LlmError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let raw = format!("{base}/{path}");

        let url = match &self.api_version {
            Some(version) if self.api_type.is_azure() => Url::parse_with_params(&raw, [("api-version", version)]),
            _ => Url::parse(&raw),
        };

        url.map_err(|e| LlmError::Internal(anyhow::anyhow!("invalid endpoint URL {raw}: {e}")))
    }

    /// Chat completions URL for a canonical model
    fn completions_url(&self, model: &str) -> Result<Url, LlmError> {
        if !self.api_type.is_azure() {
            return self.endpoint("chat/completions");
        }

        let deployment = self.router.map(model).ok_or_else(|| LlmError::ModelNotFound {
            model: model.to_owned(),
        })?;
        self.endpoint(&format!("openai/deployments/{deployment}/chat/completions"))
    }

    fn models_url(&self) -> Result<Url, LlmError> {
        if self.api_type.is_azure() {
            self.endpoint("openai/models")
        } else {
            self.endpoint("models")
        }
    }

    fn authorize(&self, mut builder: RequestBuilder) -> RequestBuilder {
        if let Some(key) = &self.api_key {
            builder = match self.api_type {
                ApiType::Azure => builder.header("api-key", key.expose_secret()),
                ApiType::OpenAi | ApiType::AzureAd => builder.bearer_auth(key.expose_secret()),
            };
        }

        if let Some(org_id) = &self.org_id {
            builder = builder.header("OpenAI-Organization", org_id);
        }

        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, LlmError> {
        let response = self.authorize(builder).send().await.map_err(|e| {
            tracing::error!(transport = self.name(), error = %e, "upstream request failed");
            LlmError::Upstream(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body).map_or(body, |parsed| parsed.error.message);

        tracing::warn!(transport = self.name(), status = %status, "upstream returned error");
        Err(LlmError::Upstream(format!("provider returned {status}: {message}")))
    }
}

#[async_trait]
impl Transport for OpenAiTransport {
    fn name(&self) -> &str {
        match self.api_type {
            ApiType::OpenAi => "openai",
            ApiType::Azure | ApiType::AzureAd => "azure",
        }
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let response = self.send(self.client.get(self.models_url()?)).await?;

        let models: ModelList = response
            .json()
            .await
            .map_err(|e| LlmError::Upstream(format!("failed to parse model list: {e}")))?;

        Ok(models.data.into_iter().map(|model| model.id).collect())
    }

    async fn create_chat_completion_stream(&self, request: &ChatCompletionRequest) -> Result<ChunkStream, LlmError> {
        let url = self.completions_url(&request.model)?;

        let mut wire_request = request.clone();
        wire_request.stream = Some(true);

        let response = self.send(self.client.post(url).json(&wire_request)).await?;

        let chunks = response
            .bytes_stream()
            .eventsource()
            .take_while(|event| future::ready(!matches!(event, Ok(event) if event.data.trim() == DONE_MARKER)))
            .filter_map(|event| {
                let decoded = match event {
                    Ok(event) if event.data.trim().is_empty() => None,
                    Ok(event) => Some(
                        serde_json::from_str::<ChatCompletionChunk>(&event.data)
                            .map_err(|e| LlmError::Streaming(format!("failed to decode chunk: {e}"))),
                    ),
                    Err(e) => Some(Err(LlmError::Streaming(e.to_string()))),
                };
                future::ready(decoded)
            });

        Ok(Box::pin(chunks))
    }
}
