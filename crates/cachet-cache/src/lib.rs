//! Response cache for streamed LLM completions
//!
//! Stores the raw chunk sequence of a completed stream under a
//! deterministic request key. Values are whole, immutable, gzip-compressed
//! JSON documents: a key is written once and afterwards only read.

pub mod codec;
mod memory;
mod valkey;

use async_trait::async_trait;
use thiserror::Error;

pub use codec::{compress, decompress};
pub use memory::MemoryStore;
pub use valkey::ValkeyStore;

/// Cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    /// Valkey connection or command error
    #[error("cache backend: {0}")]
    Backend(String),
    /// Serialization or compression error
    #[error("serialization: {0}")]
    Serialization(String),
}

/// Key-value contract the completion client relies on
///
/// Implementations synchronize internally: `get` never observes a partial
/// value and `store` replaces nothing that is already present.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a stored value
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store a value under a key that has not been written yet
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;
}
