use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Registry of every cache slot the client persists.
///
/// Read and write paths both go through this enum, so a slot name is spelled
/// exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Published articles list
    Articles,
    /// Signed-in user's saved articles with reading progress.
    ///
    /// One slot for every user: after switching accounts, a failed read can
    /// serve the previous user's snapshot until the next success.
    SavedArticles,
    /// Category list
    Categories,
}

#[derive(Debug, Error)]
#[error("Unknown cache key: {0} (expected one of: articles, saved_articles, categories)")]
pub struct CacheKeyError(pub String);

impl CacheKey {
    pub const ALL: [CacheKey; 3] = [
        CacheKey::Articles,
        CacheKey::SavedArticles,
        CacheKey::Categories,
    ];

    /// Storage key for this slot.
    pub fn as_str(self) -> &'static str {
        match self {
            CacheKey::Articles => "articles",
            CacheKey::SavedArticles => "saved_articles",
            CacheKey::Categories => "categories",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheKey {
    type Err = CacheKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CacheKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s.trim())
            .ok_or_else(|| CacheKeyError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_names() {
        assert_eq!(CacheKey::Articles.as_str(), "articles");
        assert_eq!(CacheKey::SavedArticles.as_str(), "saved_articles");
        assert_eq!(CacheKey::Categories.as_str(), "categories");
    }

    #[test]
    fn test_parse_known_keys() {
        for key in CacheKey::ALL {
            assert_eq!(key.as_str().parse::<CacheKey>().unwrap(), key);
        }
        assert_eq!(
            " saved_articles ".parse::<CacheKey>().unwrap(),
            CacheKey::SavedArticles
        );
    }

    #[test]
    fn test_parse_unknown_key() {
        let err = "saved".parse::<CacheKey>().unwrap_err();
        assert!(err.to_string().contains("saved"));
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = CacheKey::ALL.iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CacheKey::ALL.len());
    }
}
