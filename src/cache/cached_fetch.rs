use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use super::connectivity::{AlwaysOnline, Connectivity};
use super::fallback::FallbackOnError;
use super::keys::CacheKey;
use crate::storage::SlotStore;

/// How a single read was answered. Logged, never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Disabled,
    Fresh,
    Cached,
    Empty,
}

impl Resolution {
    fn as_str(self) -> &'static str {
        match self {
            Resolution::Disabled => "disabled",
            Resolution::Fresh => "fresh",
            Resolution::Cached => "cached",
            Resolution::Empty => "empty",
        }
    }
}

/// Cache-aside reader: remote first, last snapshot on failure.
///
/// Each call runs `Idle -> Fetching -> {persist and return | read cache and
/// return}` exactly once. There are no retries; a failed remote read is
/// terminal for that call and is answered from the slot, or with an empty
/// collection when the slot has nothing usable.
///
/// The caller never sees an error. Concurrent calls on the same key are not
/// coordinated: whichever persist finishes last owns the slot.
///
/// # Examples
///
/// ```no_run
/// use briefly::cache::{CacheKey, CachedFetch};
/// use briefly::storage::MemoryStore;
///
/// # async fn demo() {
/// let cache = CachedFetch::new(MemoryStore::new());
/// let titles: Vec<String> = cache
///     .fetch(CacheKey::Articles, || async {
///         Err::<Vec<String>, _>("network unreachable")
///     })
///     .await;
/// assert!(titles.is_empty());
/// # }
/// ```
pub struct CachedFetch<S> {
    store: S,
    connectivity: Arc<dyn Connectivity>,
}

impl<S: SlotStore> CachedFetch<S> {
    pub fn new(store: S) -> Self {
        Self::with_connectivity(store, Arc::new(AlwaysOnline))
    }

    pub fn with_connectivity(store: S, connectivity: Arc<dyn Connectivity>) -> Self {
        Self {
            store,
            connectivity,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read through the cache slot for `key`.
    pub async fn fetch<T, E, F, Fut>(&self, key: CacheKey, remote: F) -> Vec<T>
    where
        T: Serialize + DeserializeOwned,
        E: Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        self.fetch_if(true, key, remote).await
    }

    /// Read through the cache slot for `key`, only when `enabled`.
    ///
    /// A disabled read returns an empty collection without calling `remote`
    /// or touching the store.
    pub async fn fetch_if<T, E, F, Fut>(&self, enabled: bool, key: CacheKey, remote: F) -> Vec<T>
    where
        T: Serialize + DeserializeOwned,
        E: Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        if !enabled {
            log_resolution(key, Resolution::Disabled, 0);
            return Vec::new();
        }

        let policy = FallbackOnError::new(&self.store, key);

        let outcome = if self.is_online().await {
            remote().await.map_err(|e| e.to_string())
        } else {
            Err("device is offline".to_string())
        };

        match outcome {
            Ok(items) => {
                policy.persist(&items).await;
                log_resolution(key, Resolution::Fresh, items.len());
                items
            }
            Err(cause) => match policy.recover(&cause).await {
                Some(items) => {
                    log_resolution(key, Resolution::Cached, items.len());
                    items
                }
                None => {
                    log_resolution(key, Resolution::Empty, 0);
                    Vec::new()
                }
            },
        }
    }

    /// Current answer of the injected connectivity provider.
    pub async fn is_online(&self) -> bool {
        self.connectivity.is_online().await
    }

    /// Last persisted snapshot for `key`, or `None` if there is nothing usable.
    pub async fn snapshot<T: DeserializeOwned>(&self, key: CacheKey) -> Option<Vec<T>> {
        FallbackOnError::new(&self.store, key).read().await
    }

    /// Drop the snapshot for `key`.
    pub async fn clear(&self, key: CacheKey) -> anyhow::Result<()> {
        self.store.clear(key).await
    }
}

fn log_resolution(key: CacheKey, resolution: Resolution, items: usize) {
    tracing::debug!(key = %key, resolution = resolution.as_str(), items = items, "Cached read resolved");
}
