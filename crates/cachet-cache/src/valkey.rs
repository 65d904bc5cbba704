use async_trait::async_trait;

use crate::{CacheError, CacheStore};

/// Cache store backed by Valkey
#[derive(Clone)]
pub struct ValkeyStore {
    client: redis::Client,
    key_prefix: String,
}

impl ValkeyStore {
    /// Create a new Valkey-backed store
    ///
    /// # Errors
    ///
    /// Returns an error if the Valkey URL is invalid
    pub fn new(url: &str, key_prefix: Option<String>) -> Result<Self, CacheError> {
        let client =
            redis::Client::open(url).map_err(|e| CacheError::Backend(format!("invalid URL: {e}")))?;

        Ok(Self {
            client,
            key_prefix: key_prefix.unwrap_or_else(|| "cachet:cache".to_owned()),
        })
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{key}", self.key_prefix)
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, CacheError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Backend(format!("connection failed: {e}")))
    }
}

#[async_trait]
impl CacheStore for ValkeyStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        use redis::AsyncCommands;

        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = conn
            .get(self.namespaced(key))
            .await
            .map_err(|e| CacheError::Backend(format!("GET failed: {e}")))?;

        if value.is_some() {
            tracing::debug!(cache_key = key, "cache hit");
        } else {
            tracing::debug!(cache_key = key, "cache miss");
        }

        Ok(value)
    }

    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        use redis::AsyncCommands;

        let mut conn = self.connection().await?;

        // SETNX keeps the first writer's value when two misses race
        let written: bool = conn
            .set_nx(self.namespaced(key), value)
            .await
            .map_err(|e| CacheError::Backend(format!("SETNX failed: {e}")))?;

        tracing::debug!(cache_key = key, written, "stored response chunks");
        Ok(())
    }
}
