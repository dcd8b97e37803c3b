//! Records read from the hosted data store.
//!
//! Field names match the remote column names so rows decode without
//! renaming, and the same JSON shape is what lands in a cache slot.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Articles
// ============================================================================

/// Moderation status of an article.
///
/// Only `Published` articles are listed to readers. A status the client does
/// not know about is kept verbatim in `Other`, so a cached row is written back
/// exactly as it was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ArticleStatus {
    Draft,
    Pending,
    Published,
    Rejected,
    Scheduled,
    Other(String),
}

impl ArticleStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Pending => "pending",
            ArticleStatus::Published => "published",
            ArticleStatus::Rejected => "rejected",
            ArticleStatus::Scheduled => "scheduled",
            ArticleStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for ArticleStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "draft" => ArticleStatus::Draft,
            "pending" => ArticleStatus::Pending,
            "published" => ArticleStatus::Published,
            "rejected" => ArticleStatus::Rejected,
            "scheduled" => ArticleStatus::Scheduled,
            _ => ArticleStatus::Other(raw),
        }
    }
}

impl From<ArticleStatus> for String {
    fn from(status: ArticleStatus) -> Self {
        match status {
            ArticleStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// A news article. Identity is `id`; nothing is mutated after fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub original_url: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category_id: Option<String>,
    pub status: ArticleStatus,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub moderated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub moderated_by: Option<String>,
    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
}

impl Article {
    /// Case-insensitive substring match over title and summary.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.summary.to_lowercase().contains(needle)
    }
}

/// An article joined with the user's save and reading-progress rows.
///
/// Serialized flat: the article columns plus `saved_at`, `progress` and
/// `completed` side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedArticle {
    #[serde(flatten)]
    pub article: Article,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub completed: Option<bool>,
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_article_decodes_with_nulls() {
        let json = r#"{
            "id": "a1",
            "title": "Title",
            "summary": "Summary",
            "image_url": null,
            "source": "Wire",
            "original_url": "https://example.com/a1",
            "published_at": "2024-01-01T10:00:00+00:00",
            "category_id": null,
            "status": "published",
            "source_id": null,
            "created_at": null,
            "updated_at": null,
            "moderated_at": null,
            "moderated_by": null,
            "scheduled_for": null
        }"#;

        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.id, "a1");
        assert_eq!(article.status, ArticleStatus::Published);
        assert!(article.image_url.is_none());
        assert!(article.published_at.is_some());
    }

    #[test]
    fn test_unknown_status_is_kept_verbatim() {
        let json = r#"{"id": "a2", "title": "T", "status": "archived"}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.status, ArticleStatus::Other("archived".into()));

        let value = serde_json::to_value(&article).unwrap();
        assert_eq!(value["status"], "archived");

        let reread: Article = serde_json::from_value(value).unwrap();
        assert_eq!(reread, article);
    }

    #[test]
    fn test_known_status_serializes_lowercase() {
        let json = r#"{"id": "a5", "title": "T", "status": "scheduled"}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.status, ArticleStatus::Scheduled);
        assert_eq!(serde_json::to_value(&article).unwrap()["status"], "scheduled");
    }

    #[test]
    fn test_saved_article_is_flat() {
        let json = r#"{
            "id": "a3",
            "title": "Saved",
            "status": "published",
            "saved_at": "2024-02-01T08:30:00Z",
            "progress": 0.5,
            "completed": false
        }"#;
        let saved: SavedArticle = serde_json::from_str(json).unwrap();
        assert_eq!(saved.article.id, "a3");
        assert_eq!(saved.progress, Some(0.5));
        assert_eq!(saved.completed, Some(false));

        let value = serde_json::to_value(&saved).unwrap();
        assert_eq!(value["id"], "a3");
        assert_eq!(value["progress"], 0.5);
        assert!(value.get("article").is_none());
    }

    #[test]
    fn test_matches_title_and_summary() {
        let json = r#"{"id": "a4", "title": "Rust Weekly", "summary": "Async news", "status": "published"}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert!(article.matches("rust"));
        assert!(article.matches("async"));
        assert!(!article.matches("python"));
    }
}
