// src/ingest/providers/newsapi.rs
//! NewsAPI `/v2/everything` search: one query per watch-listed ticker, built
//! from its aliases (`"tesla" OR "tesla motors"`), limited to the recency window.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use serde::Deserialize;
use std::time::Duration;

use crate::config::Watchlist;
use crate::ingest::normalize_text;
use crate::ingest::types::{Article, ArticleSource};

const PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Response {
    status: String,
    #[serde(default)]
    total_results: Option<u64>,
    #[serde(default)]
    articles: Vec<ApiArticle>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    #[serde(default)]
    source: Option<ApiSource>,
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    name: Option<String>,
}

pub struct NewsApiSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    window_hours: u32,
    /// (ticker, query) pairs
    queries: Vec<(String, String)>,
}

impl NewsApiSource {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        watchlist: &Watchlist,
        window_hours: u32,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(anyhow!("NewsAPI key is empty"));
        }
        let client = reqwest::Client::builder()
            .user_agent("market-pulse/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(20))
            .build()
            .context("building newsapi http client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
            window_hours,
            queries: build_queries(watchlist),
        })
    }

    /// Parse one response body. A non-"ok" status is an error.
    pub fn parse_response(body: &str, scraped_at: DateTime<Utc>) -> Result<Vec<Article>> {
        let resp: Response = serde_json::from_str(body).context("parsing newsapi json")?;
        if resp.status != "ok" {
            return Err(anyhow!(
                "newsapi status `{}`: {}",
                resp.status,
                resp.message.unwrap_or_default()
            ));
        }
        tracing::debug!(target: "ingest", total_results = ?resp.total_results, "newsapi page");

        let out = resp
            .articles
            .into_iter()
            .filter_map(|a| {
                let title = normalize_text(a.title.as_deref().unwrap_or_default());
                let summary = normalize_text(a.description.as_deref().unwrap_or_default());
                if title.is_empty() && summary.is_empty() {
                    return None;
                }
                Some(Article {
                    source_timestamp: scraped_at,
                    published_time: a
                        .published_at
                        .as_deref()
                        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
                        .map(|dt| dt.with_timezone(&Utc)),
                    source_name: a
                        .source
                        .and_then(|s| s.name)
                        .unwrap_or_else(|| "NewsAPI".to_string()),
                    title,
                    summary,
                    body: normalize_text(a.content.as_deref().unwrap_or_default()),
                    url: a.url.filter(|u| !u.trim().is_empty()),
                })
            })
            .collect();
        Ok(out)
    }
}

/// `"alias one" OR "alias two"` per ticker; tickers without aliases search by symbol.
fn build_queries(watchlist: &Watchlist) -> Vec<(String, String)> {
    watchlist
        .entries()
        .iter()
        .map(|e| {
            let q = if e.aliases.is_empty() {
                format!("\"{}\"", e.ticker)
            } else {
                e.aliases
                    .iter()
                    .map(|a| format!("\"{a}\""))
                    .collect::<Vec<_>>()
                    .join(" OR ")
            };
            (e.ticker.clone(), q)
        })
        .collect()
}

/// Start of the search window; `None` when it falls outside the representable
/// range, in which case the search is unbounded.
fn window_start(now: DateTime<Utc>, window_hours: u32) -> Option<String> {
    now.checked_sub_signed(ChronoDuration::hours(i64::from(window_hours)))
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[async_trait]
impl ArticleSource for NewsApiSource {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        let now = Utc::now();
        let from = window_start(now, self.window_hours);
        let page_size = PAGE_SIZE.to_string();

        let mut out = Vec::new();
        for (ticker, q) in &self.queries {
            let mut params = vec![
                ("q", q.as_str()),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ];
            if let Some(from) = from.as_deref() {
                params.push(("from", from));
            }
            let body = self
                .client
                .get(self.base_url.as_str())
                .query(&params)
                .send()
                .await
                .with_context(|| format!("newsapi get() for {ticker}"))?
                .text()
                .await
                .with_context(|| format!("newsapi .text() for {ticker}"))?;
            let mut v = Self::parse_response(&body, now)
                .with_context(|| format!("newsapi response for {ticker}"))?;
            out.append(&mut v);
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "NewsAPI"
    }
}
