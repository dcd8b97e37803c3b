//! Composition root for the reads the client performs.
//!
//! Every list read goes through [`CachedFetch`] with its registry key. Search
//! uses the cache only partially: it never writes a slot, and on failure it
//! filters the articles snapshot locally.

mod search;

use crate::cache::{CacheKey, CachedFetch};
use crate::models::{Article, Category, SavedArticle};
use crate::remote::{RemoteError, SupabaseClient};
use crate::storage::SlotStore;

pub use search::{normalize_query, MAX_SEARCH_QUERY_LENGTH};

/// Default number of articles requested per list.
pub const DEFAULT_ARTICLE_LIMIT: u32 = 50;

pub struct Reader<S> {
    remote: Option<SupabaseClient>,
    cache: CachedFetch<S>,
    article_limit: u32,
}

impl<S: SlotStore> Reader<S> {
    pub fn new(remote: SupabaseClient, cache: CachedFetch<S>) -> Self {
        Self {
            remote: Some(remote),
            cache,
            article_limit: DEFAULT_ARTICLE_LIMIT,
        }
    }

    /// Reader with no backend. Every read is answered from the cache.
    pub fn cache_only(cache: CachedFetch<S>) -> Self {
        Self {
            remote: None,
            cache,
            article_limit: DEFAULT_ARTICLE_LIMIT,
        }
    }

    /// Cap on rows requested by list and search reads. Zero is treated as one.
    pub fn with_article_limit(mut self, limit: u32) -> Self {
        self.article_limit = limit.max(1);
        self
    }

    pub fn cache(&self) -> &CachedFetch<S> {
        &self.cache
    }

    fn remote(&self) -> Result<&SupabaseClient, RemoteError> {
        self.remote.as_ref().ok_or(RemoteError::NotConfigured)
    }

    /// Published articles, newest first.
    pub async fn articles(&self) -> Vec<Article> {
        let limit = self.article_limit;
        self.cache
            .fetch(CacheKey::Articles, || async move {
                self.remote()?.published_articles(limit).await
            })
            .await
    }

    /// Saved articles of `user_id`. Empty, without any I/O, when nobody is signed in.
    pub async fn saved_articles(&self, user_id: Option<&str>) -> Vec<SavedArticle> {
        let user_id = user_id.map(str::trim).filter(|id| !id.is_empty());
        self.cache
            .fetch_if(user_id.is_some(), CacheKey::SavedArticles, || async move {
                self.remote()?
                    .saved_articles(user_id.unwrap_or_default())
                    .await
            })
            .await
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.cache
            .fetch(CacheKey::Categories, || async move {
                self.remote()?.categories().await
            })
            .await
    }

    /// Articles matching `query`. Never persisted; falls back to filtering
    /// the articles snapshot when the remote search fails.
    pub async fn search(&self, query: &str) -> Vec<Article> {
        let Some(query) = normalize_query(query) else {
            return Vec::new();
        };

        let outcome = if self.cache.is_online().await {
            let found = match self.remote() {
                Ok(remote) => remote.search_articles(&query, self.article_limit).await,
                Err(e) => Err(e),
            };
            found.map_err(|e| e.to_string())
        } else {
            Err("device is offline".to_string())
        };

        match outcome {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = %e, "Remote search failed, searching cached articles");
                let cached: Vec<Article> = self
                    .cache
                    .snapshot(CacheKey::Articles)
                    .await
                    .unwrap_or_default();
                search::filter_local(cached, &query, self.article_limit as usize)
            }
        }
    }
}
