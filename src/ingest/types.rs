// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// One raw news article as delivered by a source.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq, Hash)]
pub struct Article {
    /// When the article was fetched; always present, fallback ordering key.
    pub source_timestamp: DateTime<Utc>,
    /// Publisher timestamp; `None` when absent or unparseable.
    pub published_time: Option<DateTime<Utc>>,
    pub source_name: String, // e.g., "YahooFinance", "Reuters"
    pub title: String,
    pub summary: String,
    pub body: String,
    pub url: Option<String>,
}

impl Article {
    /// Text used for ticker attribution and scoring.
    pub fn text(&self) -> String {
        format!("{} {} {}", self.title, self.summary, self.body)
    }

    /// Publish time if known, else fetch time.
    pub fn event_time(&self) -> DateTime<Utc> {
        self.published_time.unwrap_or(self.source_timestamp)
    }

    /// Non-empty URL, the article's identity when present.
    pub fn identity_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Article>>;
    fn name(&self) -> &str;
}
