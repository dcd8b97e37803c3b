use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::schema::Database;
use super::types::SlotInfo;
use crate::cache::CacheKey;

/// Key/value persistence for cache slots.
///
/// One string value per [`CacheKey`]; `store` replaces whatever was there.
#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn load(&self, key: CacheKey) -> Result<Option<String>>;
    async fn store(&self, key: CacheKey, value: &str) -> Result<()>;
    async fn clear(&self, key: CacheKey) -> Result<()>;
    /// Every stored slot with its size, ordered by key.
    async fn slots(&self) -> Result<Vec<SlotInfo>>;
}

#[async_trait]
impl SlotStore for Database {
    async fn load(&self, key: CacheKey) -> Result<Option<String>> {
        self.get_slot(key.as_str()).await
    }

    async fn store(&self, key: CacheKey, value: &str) -> Result<()> {
        self.set_slot(key.as_str(), value).await
    }

    async fn clear(&self, key: CacheKey) -> Result<()> {
        self.clear_slot(key.as_str()).await.map(|_| ())
    }

    async fn slots(&self) -> Result<Vec<SlotInfo>> {
        self.slot_info().await
    }
}

#[async_trait]
impl<S: SlotStore + ?Sized> SlotStore for Arc<S> {
    async fn load(&self, key: CacheKey) -> Result<Option<String>> {
        (**self).load(key).await
    }

    async fn store(&self, key: CacheKey, value: &str) -> Result<()> {
        (**self).store(key, value).await
    }

    async fn clear(&self, key: CacheKey) -> Result<()> {
        (**self).clear(key).await
    }

    async fn slots(&self) -> Result<Vec<SlotInfo>> {
        (**self).slots().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_store_uses_registry_names() {
        let db = Database::open(":memory:").await.unwrap();
        db.store(CacheKey::SavedArticles, "[]").await.unwrap();

        assert_eq!(db.get_slot("saved_articles").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(db.load(CacheKey::SavedArticles).await.unwrap().as_deref(), Some("[]"));
        assert_eq!(db.load(CacheKey::Articles).await.unwrap(), None);

        assert_eq!(db.slots().await.unwrap()[0].key, "saved_articles");
        db.clear(CacheKey::SavedArticles).await.unwrap();
        assert_eq!(db.load(CacheKey::SavedArticles).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_arc_forwards() {
        let db: Arc<dyn SlotStore> = Arc::new(Database::open(":memory:").await.unwrap());
        db.store(CacheKey::Categories, "[1]").await.unwrap();
        assert_eq!(db.load(CacheKey::Categories).await.unwrap().as_deref(), Some("[1]"));
    }
}
