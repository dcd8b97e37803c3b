use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::store::SlotStore;
use super::types::SlotInfo;
use crate::cache::CacheKey;

#[derive(Debug)]
struct Entry {
    value: String,
    updated_at: String,
}

/// Process-local slot store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<CacheKey, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SlotStore for MemoryStore {
    async fn load(&self, key: CacheKey) -> Result<Option<String>> {
        Ok(self
            .slots
            .lock()
            .await
            .get(&key)
            .map(|entry| entry.value.clone()))
    }

    async fn store(&self, key: CacheKey, value: &str) -> Result<()> {
        let entry = Entry {
            value: value.to_string(),
            // Same shape as SQLite's datetime('now')
            updated_at: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        };
        self.slots.lock().await.insert(key, entry);
        Ok(())
    }

    async fn clear(&self, key: CacheKey) -> Result<()> {
        self.slots.lock().await.remove(&key);
        Ok(())
    }

    async fn slots(&self) -> Result<Vec<SlotInfo>> {
        let slots = self.slots.lock().await;
        let mut info: Vec<SlotInfo> = slots
            .iter()
            .map(|(key, entry)| SlotInfo {
                key: key.as_str().to_string(),
                size_bytes: entry.value.len() as i64,
                updated_at: entry.updated_at.clone(),
            })
            .collect();
        info.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(info)
    }
}
