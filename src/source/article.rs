//! The headline record shared by the fetch client, presenter and UI.
//!
//! [`Article`] is the flat, immutable value the rest of the application works
//! with.  The NewsAPI wire shape (nested `source` object, camelCase keys) is
//! decoded into [`ApiArticle`] first and then flattened, so nothing outside
//! this module needs to know what the JSON looks like.
//!
//! ## For contributors
//!
//! If NewsAPI grows a field you want to show, add it to both structs and to
//! the `From` impl below.  Required keys stay non-`Option` so that a payload
//! missing them fails to decode instead of rendering a blank row.

use chrono::DateTime;
use serde::Deserialize;

/// A single news headline, normalised from the API response.
///
/// Articles keep the order the server returned them in; the presenter never
/// sorts or de-duplicates.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Article {
    /// Provider-assigned source identifier (often `null` for smaller outlets).
    pub source_id: Option<String>,

    /// Display name of the outlet, e.g. "Reuters".
    pub source_name: String,

    pub author: Option<String>,

    /// Headline text.
    pub title: String,

    pub description: Option<String>,

    /// Absolute link to the full story.  Handed to the viewer and share
    /// collaborators verbatim.
    pub url: String,

    /// Thumbnail location, if the provider supplied one.
    pub image_url: Option<String>,

    /// ISO-8601 timestamp exactly as sent.  Only parsed for display.
    pub published_at: String,
}

impl Article {
    /// Format `published_at` for the list view.
    ///
    /// RFC 3339 timestamps render as `YYYY-MM-DD HH:MM`; anything else is
    /// shown as-is so an odd upstream format is still visible.
    pub fn display_date(&self) -> String {
        match DateTime::parse_from_rfc3339(&self.published_at) {
            Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
            Err(_) => self.published_at.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Top-level body of a successful `top-headlines` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HeadlinesResponse {
    pub status: String,
    pub total_results: u64,
    pub articles: Vec<ApiArticle>,
}

/// Body NewsAPI sends instead of [`HeadlinesResponse`] when a request is
/// rejected (bad key, rate limit, unknown parameter).
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub status: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiSource {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiArticle {
    pub source: ApiSource,
    pub author: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    pub published_at: String,
}

impl From<ApiArticle> for Article {
    fn from(a: ApiArticle) -> Self {
        Article {
            source_id: a.source.id,
            source_name: a.source.name,
            author: a.author,
            title: a.title,
            description: a.description,
            url: a.url,
            image_url: a.url_to_image,
            published_at: a.published_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Shorthand constructor for tests across the crate.
    pub fn make_article(title: &str, url: &str) -> Article {
        Article {
            source_id: None,
            source_name: "test".to_string(),
            author: None,
            title: title.to_string(),
            description: None,
            url: url.to_string(),
            image_url: None,
            published_at: "2024-05-01T12:30:00Z".to_string(),
        }
    }

    #[test]
    fn display_date_formats_rfc3339() {
        let a = make_article("A", "http://a");
        assert_eq!(a.display_date(), "2024-05-01 12:30");
    }

    #[test]
    fn display_date_keeps_unparseable_text() {
        let mut a = make_article("A", "http://a");
        a.published_at = "yesterday".to_string();
        assert_eq!(a.display_date(), "yesterday");
    }

    #[test]
    fn from_api_article_flattens_source() {
        let json = r#"{
            "source": {"id": "bbc-news", "name": "BBC News"},
            "author": null,
            "title": "Headline",
            "description": "Body",
            "url": "https://bbc.co.uk/1",
            "urlToImage": "https://bbc.co.uk/1.jpg",
            "publishedAt": "2024-05-01T12:30:00Z"
        }"#;
        let api: ApiArticle = serde_json::from_str(json).unwrap();
        let article = Article::from(api);

        assert_eq!(article.source_id.as_deref(), Some("bbc-news"));
        assert_eq!(article.source_name, "BBC News");
        assert!(article.author.is_none());
        assert_eq!(article.image_url.as_deref(), Some("https://bbc.co.uk/1.jpg"));
    }

    #[test]
    fn missing_optional_keys_decode_as_none() {
        let json = r#"{
            "source": {"name": "Wire"},
            "title": "T",
            "url": "http://t",
            "publishedAt": "2024-01-01T00:00:00Z"
        }"#;
        let api: ApiArticle = serde_json::from_str(json).unwrap();
        let article = Article::from(api);

        assert!(article.source_id.is_none());
        assert!(article.description.is_none());
        assert!(article.image_url.is_none());
    }
}
