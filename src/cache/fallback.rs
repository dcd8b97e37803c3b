//! The error policy of the cache-aside read path.
//!
//! Remote failures are answered with the last persisted snapshot or an empty
//! collection, and persistence is best-effort. Neither direction ever
//! returns an error to the caller; every swallowed failure is logged here.
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;

use super::keys::CacheKey;
use crate::storage::SlotStore;

/// Fallback policy bound to one slot of one store.
pub struct FallbackOnError<'a, S: ?Sized> {
    store: &'a S,
    key: CacheKey,
}

impl<'a, S: SlotStore + ?Sized> FallbackOnError<'a, S> {
    pub fn new(store: &'a S, key: CacheKey) -> Self {
        Self { store, key }
    }

    /// Answer a failed remote read from the slot.
    ///
    /// Returns `None` when the slot is missing, unreadable, or does not decode.
    pub async fn recover<T, E>(&self, cause: &E) -> Option<Vec<T>>
    where
        T: DeserializeOwned,
        E: Display + ?Sized,
    {
        tracing::warn!(key = %self.key, error = %cause, "Remote read failed, falling back to cache");
        self.read().await
    }

    /// Read and decode the slot, treating every failure as a miss.
    pub async fn read<T: DeserializeOwned>(&self) -> Option<Vec<T>> {
        let raw = match self.store.load(self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %self.key, "Cache slot is empty");
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read cache slot");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => Some(items),
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    error = %e,
                    size_bytes = raw.len(),
                    "Cache slot holds an unreadable snapshot, ignoring it"
                );
                None
            }
        }
    }

    /// Overwrite the slot with `items`. Failures are logged and dropped.
    pub async fn persist<T: Serialize>(&self, items: &[T]) {
        let raw = match serde_json::to_string(items) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to serialize snapshot");
                return;
            }
        };

        match self.store.store(self.key, &raw).await {
            Ok(()) => {
                tracing::trace!(key = %self.key, items = items.len(), "Persisted snapshot");
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to persist snapshot");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SlotInfo};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    struct BrokenStore;

    #[async_trait]
    impl SlotStore for BrokenStore {
        async fn load(&self, _key: CacheKey) -> Result<Option<String>> {
            Err(anyhow!("disk unavailable"))
        }
        async fn store(&self, _key: CacheKey, _value: &str) -> Result<()> {
            Err(anyhow!("disk full"))
        }
        async fn clear(&self, _key: CacheKey) -> Result<()> {
            Err(anyhow!("disk unavailable"))
        }
        async fn slots(&self) -> Result<Vec<SlotInfo>> {
            Err(anyhow!("disk unavailable"))
        }
    }

    #[tokio::test]
    async fn test_persist_then_read() {
        let store = MemoryStore::new();
        let policy = FallbackOnError::new(&store, CacheKey::Categories);

        policy.persist(&["a".to_string(), "b".to_string()]).await;
        let items: Option<Vec<String>> = policy.read().await;
        assert_eq!(items, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[tokio::test]
    async fn test_recover_missing_slot() {
        let store = MemoryStore::new();
        let policy = FallbackOnError::new(&store, CacheKey::Articles);

        let items: Option<Vec<String>> = policy.recover("connection refused").await;
        assert!(items.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_a_miss() {
        let store = MemoryStore::new();
        store.store(CacheKey::Articles, "{not json").await.unwrap();
        let policy = FallbackOnError::new(&store, CacheKey::Articles);

        let items: Option<Vec<String>> = policy.recover("timeout").await;
        assert!(items.is_none());
    }

    #[tokio::test]
    async fn test_wrong_shape_is_a_miss() {
        let store = MemoryStore::new();
        store.store(CacheKey::Articles, r#"{"id":"1"}"#).await.unwrap();
        let policy = FallbackOnError::new(&store, CacheKey::Articles);

        let items: Option<Vec<String>> = policy.read().await;
        assert!(items.is_none());
    }

    #[tokio::test]
    async fn test_broken_store_never_errors() {
        let policy = FallbackOnError::new(&BrokenStore, CacheKey::SavedArticles);

        policy.persist(&[1, 2, 3]).await;
        let items: Option<Vec<i32>> = policy.recover("503").await;
        assert!(items.is_none());
    }
}
