use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::{CacheError, CacheStore};

/// Process-local cache store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been stored yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let value = self.entries.get(key).map(|entry| entry.value().clone());
        tracing::debug!(cache_key = key, hit = value.is_some(), "memory cache lookup");
        Ok(value)
    }

    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        match self.entries.entry(key.to_owned()) {
            Entry::Occupied(_) => {
                tracing::debug!(cache_key = key, "entry already present, keeping original");
            }
            Entry::Vacant(slot) => {
                slot.insert(value);
                tracing::debug!(cache_key = key, "stored entry");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_is_none() {
        let store = MemoryStore::new();
        assert!(store.get("absent").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn stored_value_is_returned() {
        let store = MemoryStore::new();
        store.store("k", vec![1, 2, 3]).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn entries_are_immutable() {
        let store = MemoryStore::new();
        store.store("k", vec![1]).await.unwrap();
        store.store("k", vec![2]).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(vec![1]));
    }
}
