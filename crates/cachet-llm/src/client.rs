//! Completion orchestration: cache lookup, live streaming, and status events

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use cachet_cache::{CacheStore, MemoryStore, ValkeyStore, compress, decompress};
use cachet_config::{CacheBackendConfig, Config, OpenAiConfig};
use cachet_core::CallContext;
use futures_util::StreamExt;
use tokio::sync::mpsc;

use crate::assemble::{StreamAssembler, assemble};
use crate::cache_key::CacheKeyDeriver;
use crate::compile::RequestCompiler;
use crate::error::LlmError;
use crate::protocol::openai::{ChatCompletionChunk, ChatCompletionRequest};
use crate::transport::{OpenAiTransport, Transport};
use crate::types::{CompletionMessage, CompletionRequest, CompletionStatus, Role, StatusEvent};

/// Placeholder shown while a live call waits for its first chunk
pub const WAITING_MESSAGE: &str = "Waiting for model response...";

/// Caching, streaming completion client
///
/// Every setting is resolved at construction. Calls share only the cache
/// store and the completion id counter.
pub struct Client {
    transport: Arc<dyn Transport>,
    cache: Arc<dyn CacheStore>,
    compiler: RequestCompiler,
    keys: CacheKeyDeriver,
    cache_enabled: bool,
    set_seed: bool,
    invalid_auth: bool,
    completion_ids: AtomicU64,
}

impl Client {
    /// Create a client over explicit collaborators
    pub fn new(
        config: &OpenAiConfig,
        cache_enabled: bool,
        transport: Arc<dyn Transport>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            transport,
            cache,
            compiler: RequestCompiler::new(config.default_model.clone(), config.user.clone()),
            keys: CacheKeyDeriver::from_config(config),
            cache_enabled,
            set_seed: config.set_seed,
            invalid_auth: config.api_key.is_none() && config.base_url.is_none(),
            completion_ids: AtomicU64::new(0),
        }
    }

    /// Create a client with the configured transport and cache backend
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Internal` if the transport or cache backend
    /// cannot be built
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let transport = OpenAiTransport::new(&config.openai)?;

        let cache: Arc<dyn CacheStore> = match &config.cache.backend {
            CacheBackendConfig::Memory => Arc::new(MemoryStore::new()),
            CacheBackendConfig::Valkey(valkey) => Arc::new(
                ValkeyStore::new(valkey.url.as_str(), Some(valkey.key_prefix.clone()))
                    .map_err(|e| anyhow::anyhow!("failed to create cache backend: {e}"))?,
            ),
        };

        tracing::debug!(
            transport = transport.name(),
            cache_enabled = config.cache.is_enabled(),
            default_model = %config.openai.default_model,
            "completion client ready"
        );

        Ok(Self::new(
            &config.openai,
            config.cache.is_enabled(),
            Arc::new(transport),
            cache,
        ))
    }

    /// Model used when a request leaves it empty
    pub fn default_model(&self) -> &str {
        self.compiler.default_model()
    }

    /// Check that a credential or endpoint is configured
    pub fn valid_auth(&self) -> Result<(), LlmError> {
        if self.invalid_auth {
            return Err(LlmError::Unauthorized(
                "OPENAI_API_KEY is not set. Please set the OPENAI_API_KEY environment variable".to_owned(),
            ));
        }
        Ok(())
    }

    /// Model ids served by the endpoint, sorted ascending
    ///
    /// Only answers for the default provider: when `providers` is non-empty
    /// and does not contain `""`, the list is empty.
    pub async fn list_models(&self, ctx: &CallContext, providers: &[&str]) -> Result<Vec<String>, LlmError> {
        if !providers.is_empty() && !providers.contains(&"") {
            return Ok(Vec::new());
        }

        self.valid_auth()?;

        let mut models = tokio::select! {
            biased;
            () = ctx.cancellation().cancelled() => return Err(LlmError::Cancelled),
            listed = self.transport.list_models() => listed?,
        };
        models.sort();
        Ok(models)
    }

    /// Whether the endpoint serves `model`
    pub async fn supports(&self, ctx: &CallContext, model: &str) -> Result<bool, LlmError> {
        let models = self.list_models(ctx, &[]).await?;
        Ok(models.iter().any(|candidate| candidate == model))
    }

    /// Run one completion, pushing progress to `status`
    ///
    /// Emits exactly one `Submitted` event, then either a cached `Final`
    /// event or a waiting placeholder, one `Partial` per received chunk and
    /// an uncached `Final`. Sends wait for room in the channel, so a caller
    /// that stops draining it stalls the stream.
    pub async fn call(
        &self,
        ctx: &CallContext,
        request: CompletionRequest,
        status: &mpsc::Sender<CompletionStatus>,
    ) -> Result<CompletionMessage, LlmError> {
        self.valid_auth()?;

        let mut wire = self.compiler.compile(&request)?;
        let completion_id = self.next_completion_id();

        emit(
            ctx,
            status,
            &completion_id,
            StatusEvent::Submitted {
                request: Box::new(wire.clone()),
            },
        )
        .await?;

        // Seeded before the lookup, so the seed is part of the key
        if request.set_seed.unwrap_or(self.set_seed) {
            wire.seed = Some(CacheKeyDeriver::seed(&wire)?);
        }
        let cache_key = self.keys.key(&wire)?;

        let (chunks, cached) = match self.lookup(ctx, &request, &cache_key).await? {
            Some(chunks) => (chunks, true),
            None => {
                let chunks = self.stream(ctx, &wire, &completion_id, status).await?;
                if self.should_store(ctx, &request) {
                    self.store(&cache_key, &chunks).await?;
                }
                (chunks, false)
            }
        };

        let message = assemble(&chunks);

        emit(
            ctx,
            status,
            &completion_id,
            StatusEvent::Final {
                chunks,
                message: message.clone(),
                cached,
            },
        )
        .await?;

        Ok(message)
    }

    fn next_completion_id(&self) -> String {
        (self.completion_ids.fetch_add(1, Ordering::Relaxed) + 1).to_string()
    }

    fn should_lookup(&self, ctx: &CallContext, request: &CompletionRequest) -> bool {
        !ctx.is_cache_disabled() && request.cache.unwrap_or(self.cache_enabled)
    }

    /// A request that opts out of lookups still refreshes the entry
    fn should_store(&self, ctx: &CallContext, request: &CompletionRequest) -> bool {
        !ctx.is_cache_disabled() && (self.cache_enabled || request.cache == Some(true))
    }

    async fn lookup(
        &self,
        ctx: &CallContext,
        request: &CompletionRequest,
        cache_key: &str,
    ) -> Result<Option<Vec<ChatCompletionChunk>>, LlmError> {
        if !self.should_lookup(ctx, request) {
            return Ok(None);
        }

        let stored = tokio::select! {
            biased;
            () = ctx.cancellation().cancelled() => return Err(LlmError::Cancelled),
            stored = self.cache.get(cache_key) => stored.map_err(LlmError::CacheRead)?,
        };

        let Some(bytes) = stored else {
            tracing::debug!(cache_key, "cache miss");
            return Ok(None);
        };

        let chunks: Vec<ChatCompletionChunk> = decompress(&bytes).map_err(LlmError::CacheRead)?;
        tracing::debug!(cache_key, chunks = chunks.len(), "cache hit");
        Ok(Some(chunks))
    }

    async fn store(&self, cache_key: &str, chunks: &[ChatCompletionChunk]) -> Result<(), LlmError> {
        let bytes = compress(chunks).map_err(LlmError::CacheWrite)?;
        self.cache
            .store(cache_key, bytes)
            .await
            .map_err(LlmError::CacheWrite)?;

        tracing::debug!(cache_key, chunks = chunks.len(), "stored response");
        Ok(())
    }

    /// Stream a live completion, emitting the folded message after every chunk
    async fn stream(
        &self,
        ctx: &CallContext,
        request: &ChatCompletionRequest,
        completion_id: &str,
        status: &mpsc::Sender<CompletionStatus>,
    ) -> Result<Vec<ChatCompletionChunk>, LlmError> {
        emit(
            ctx,
            status,
            completion_id,
            StatusEvent::Partial {
                message: CompletionMessage::text(Role::Assistant, WAITING_MESSAGE),
            },
        )
        .await?;

        let transport = self.transport.name();
        tracing::debug!(transport, completion_id, messages = ?request.messages, "calling model");

        let mut stream = tokio::select! {
            biased;
            () = ctx.cancellation().cancelled() => return Err(LlmError::Cancelled),
            opened = self.transport.create_chat_completion_stream(request) => opened?,
        };

        let mut assembler = StreamAssembler::new();
        let mut chunks = Vec::new();

        loop {
            let next = tokio::select! {
                biased;
                () = ctx.cancellation().cancelled() => return Err(LlmError::Cancelled),
                next = stream.next() => next,
            };

            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk.inspect_err(|e| {
                tracing::warn!(transport, completion_id, error = %e, "stream failed");
            })?;

            if let Some(content) = chunk.delta().and_then(|delta| delta.content.as_deref()) {
                tracing::trace!(completion_id, content, "stream");
            }

            assembler.push(&chunk);
            chunks.push(chunk);

            emit(
                ctx,
                status,
                completion_id,
                StatusEvent::Partial {
                    message: assembler.message().clone(),
                },
            )
            .await?;
        }

        Ok(chunks)
    }
}

/// Push one event, waiting for room unless the call is cancelled
///
/// A closed channel means the caller stopped listening; the call goes on.
async fn emit(
    ctx: &CallContext,
    status: &mpsc::Sender<CompletionStatus>,
    completion_id: &str,
    event: StatusEvent,
) -> Result<(), LlmError> {
    let update = CompletionStatus {
        completion_id: completion_id.to_owned(),
        event,
    };

    tokio::select! {
        biased;
        () = ctx.cancellation().cancelled() => Err(LlmError::Cancelled),
        sent = status.send(update) => {
            if sent.is_err() {
                tracing::debug!(completion_id, "status receiver dropped");
            }
            Ok(())
        }
    }
}
