//! Plain-text rendering of lists for the terminal.
use std::borrow::Cow;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::models::{Article, Category, SavedArticle};
use crate::storage::SlotInfo;

const ELLIPSIS: &str = "...";

/// Cut `s` to at most `max_width` terminal columns, marking the cut with `...`.
pub fn truncate(s: &str, max_width: usize) -> Cow<'_, str> {
    if UnicodeWidthStr::width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let budget = max_width.saturating_sub(ELLIPSIS.len());
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    if max_width >= ELLIPSIS.len() {
        out.push_str(ELLIPSIS);
    }
    Cow::Owned(out)
}

fn date(article: &Article) -> String {
    article
        .published_at
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".to_string())
}

pub fn article_line(article: &Article, width: usize) -> String {
    let line = format!("{}  {}  {}", date(article), article.source, article.title);
    truncate(&line, width).into_owned()
}

pub fn saved_line(saved: &SavedArticle, width: usize) -> String {
    let marker = match (saved.completed, saved.progress) {
        (Some(true), _) => "done".to_string(),
        (_, Some(p)) => format!("{:>3}%", (p * 100.0).round() as u32),
        _ => "   -".to_string(),
    };
    let line = format!(
        "{}  {}  {}",
        saved.saved_at.format("%Y-%m-%d"),
        marker,
        saved.article.title
    );
    truncate(&line, width).into_owned()
}

pub fn category_line(category: &Category) -> String {
    match &category.slug {
        Some(slug) => format!("{} ({slug})", category.name),
        None => category.name.clone(),
    }
}

pub fn slot_line(info: &SlotInfo) -> String {
    format!(
        "{:<16} {:>10} bytes  written {}",
        info.key, info.size_bytes, info.updated_at
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleStatus;
    use chrono::{TimeZone, Utc};

    fn article(title: &str) -> Article {
        Article {
            id: "1".into(),
            title: title.into(),
            summary: String::new(),
            image_url: None,
            source: "Wire".into(),
            original_url: "https://example.com/1".into(),
            published_at: Some(Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()),
            category_id: None,
            status: ArticleStatus::Published,
            source_id: None,
            created_at: None,
            updated_at: None,
            moderated_at: None,
            moderated_by: None,
            scheduled_for: None,
        }
    }

    #[test]
    fn test_truncate_fits() {
        assert!(matches!(truncate("short", 10), Cow::Borrowed("short")));
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("Hello, World!", 8), "Hello...");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each CJK char is 2 columns; 7 - 3 leaves room for two
        let out = truncate("你好世界", 7);
        assert_eq!(out, "你好...");
        assert!(UnicodeWidthStr::width(out.as_ref()) <= 7);
    }

    #[test]
    fn test_truncate_tiny_width() {
        assert_eq!(truncate("Hello", 2), "");
        assert_eq!(truncate("Hello", 0), "");
    }

    #[test]
    fn test_article_line() {
        let line = article_line(&article("Big news"), 80);
        assert_eq!(line, "2024-05-06  Wire  Big news");
    }

    #[test]
    fn test_article_line_without_date() {
        let mut a = article("Undated");
        a.published_at = None;
        assert!(article_line(&a, 80).starts_with("----------"));
    }

    #[test]
    fn test_saved_line_progress() {
        let saved = SavedArticle {
            article: article("Long read"),
            saved_at: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            progress: Some(0.42),
            completed: Some(false),
        };
        assert_eq!(saved_line(&saved, 80), "2024-01-02   42%  Long read");

        let done = SavedArticle {
            completed: Some(true),
            ..saved
        };
        assert_eq!(saved_line(&done, 80), "2024-01-02  done  Long read");
    }

    #[test]
    fn test_category_line() {
        let category = Category {
            id: "c".into(),
            name: "World".into(),
            slug: Some("world".into()),
            description: None,
            created_at: None,
        };
        assert_eq!(category_line(&category), "World (world)");
    }
}
