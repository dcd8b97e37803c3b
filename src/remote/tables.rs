use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

use super::client::{RemoteError, SupabaseClient};
use super::query::{sanitize_term, Direction, Query};
use crate::models::{Article, Category, SavedArticle};

/// Row of `saved_articles` with the article embedded through its foreign key.
#[derive(Debug, Deserialize)]
struct SavedRow {
    created_at: DateTime<Utc>,
    /// `None` when the article was deleted after it was saved
    article: Option<Article>,
}

#[derive(Debug, Deserialize)]
struct ProgressRow {
    article_id: String,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    completed: Option<bool>,
}

impl SupabaseClient {
    /// Newest published articles, undated ones last.
    pub async fn published_articles(&self, limit: u32) -> Result<Vec<Article>, RemoteError> {
        let query = Query::new()
            .select("*")
            .eq("status", "published")
            .order("published_at", Direction::Desc, true)
            .limit(limit);
        self.select("articles", &query).await
    }

    /// The user's saved articles, most recently saved first, with reading progress.
    pub async fn saved_articles(&self, user_id: &str) -> Result<Vec<SavedArticle>, RemoteError> {
        let saved_query = Query::new()
            .select("created_at,article:articles(*)")
            .eq("user_id", user_id)
            .order("created_at", Direction::Desc, false);
        let progress_query = Query::new()
            .select("article_id,progress,completed")
            .eq("user_id", user_id);

        let (saved, progress) = futures::try_join!(
            self.select::<SavedRow>("saved_articles", &saved_query),
            self.select::<ProgressRow>("reading_progress", &progress_query),
        )?;

        Ok(join_saved(saved, progress))
    }

    pub async fn categories(&self) -> Result<Vec<Category>, RemoteError> {
        let query = Query::new().select("*").order("name", Direction::Asc, false);
        self.select("categories", &query).await
    }

    /// Published articles whose title or summary contains `term`, case-insensitively.
    ///
    /// `term` is sanitized first; an empty result of sanitizing yields no rows
    /// without a request.
    pub async fn search_articles(&self, term: &str, limit: u32) -> Result<Vec<Article>, RemoteError> {
        let term = sanitize_term(term);
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let query = Query::new()
            .select("*")
            .eq("status", "published")
            .or(&[
                format!("title.ilike.*{term}*"),
                format!("summary.ilike.*{term}*"),
            ])
            .order("published_at", Direction::Desc, true)
            .limit(limit);
        self.select("articles", &query).await
    }
}

/// Attach reading progress to saved rows, dropping rows whose article is gone.
///
/// Progress is clamped to `0.0..=1.0`; a non-finite value is discarded.
fn join_saved(saved: Vec<SavedRow>, progress: Vec<ProgressRow>) -> Vec<SavedArticle> {
    let mut progress: HashMap<String, ProgressRow> = progress
        .into_iter()
        .map(|row| (row.article_id.clone(), row))
        .collect();

    let mut dropped = 0usize;
    let mut out = Vec::with_capacity(saved.len());
    for row in saved {
        let Some(article) = row.article else {
            dropped += 1;
            continue;
        };
        let reading = progress.remove(&article.id);
        out.push(SavedArticle {
            saved_at: row.created_at,
            progress: reading
                .as_ref()
                .and_then(|r| r.progress)
                .filter(|p| p.is_finite())
                .map(|p| p.clamp(0.0, 1.0)),
            completed: reading.and_then(|r| r.completed),
            article,
        });
    }

    if dropped > 0 {
        tracing::debug!(dropped = dropped, "Skipped saved rows without an article");
    }
    out
}
