use cachet_cache::CacheError;
use thiserror::Error;

/// Errors surfaced by a completion call
///
/// Every variant reaches the caller unchanged. Nothing here is retried.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No credential or endpoint identity is configured
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The request compiled to nothing that can be sent
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Deployment routing has no mapping for the requested model
    #[error("model not found: {model}")]
    ModelNotFound { model: String },

    /// Reading or decoding a cached response failed
    #[error("cache read failed: {0}")]
    CacheRead(#[source] CacheError),

    /// Encoding or writing a response to the cache failed
    #[error("cache write failed: {0}")]
    CacheWrite(#[source] CacheError),

    /// The provider refused the request or could not be reached
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Transport or decode failure after the stream was opened
    #[error("streaming error: {0}")]
    Streaming(String),

    /// The caller's cancellation signal fired
    #[error("completion cancelled")]
    Cancelled,

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
