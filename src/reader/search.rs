use crate::models::Article;

/// Longest query accepted; longer input is cut at a character boundary.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;

/// Trim and bound a user query. `None` for blank input.
pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_SEARCH_QUERY_LENGTH).collect())
}

/// Case-insensitive title/summary filter over a cached article list.
pub(super) fn filter_local(articles: Vec<Article>, query: &str, limit: usize) -> Vec<Article> {
    let needle = query.to_lowercase();
    articles
        .into_iter()
        .filter(|article| article.matches(&needle))
        .take(limit)
        .collect()
}
