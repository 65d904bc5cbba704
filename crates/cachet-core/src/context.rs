use tokio_util::sync::CancellationToken;

/// Runtime context for a single completion call
///
/// Carries the caller's cancellation signal and whether the response
/// cache should be bypassed for this call.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancellation: CancellationToken,
    cache_disabled: bool,
}

impl CallContext {
    /// Context with a fresh cancellation token and caching allowed
    pub fn new() -> Self {
        Self::default()
    }

    /// Context driven by an existing cancellation token
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            cache_disabled: false,
        }
    }

    /// Disable cache lookups and writes for every call using this context
    #[must_use]
    pub const fn without_cache(mut self) -> Self {
        self.cache_disabled = true;
        self
    }

    /// Whether the cache is bypassed
    pub const fn is_cache_disabled(&self) -> bool {
        self.cache_disabled
    }

    /// Cancellation token observed by the call
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Whether the caller has already cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_allows_cache() {
        let ctx = CallContext::new();
        assert!(!ctx.is_cache_disabled());
        assert!(!ctx.is_cancelled());
    }

    #[test]
    fn without_cache_sets_flag() {
        assert!(CallContext::new().without_cache().is_cache_disabled());
    }

    #[test]
    fn cancellation_is_shared_with_token() {
        let token = CancellationToken::new();
        let ctx = CallContext::with_cancellation(token.clone());
        token.cancel();
        assert!(ctx.is_cancelled());
    }
}
