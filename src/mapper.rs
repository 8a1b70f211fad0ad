//! # Article Mapper
//! Raw articles → one `MappedRow` per (article, matched ticker).
//!
//! Steps: concatenate source batches, dedupe (URL when present, else the whole
//! record), drop articles published before the recency window, then fan out
//! over the tickers each article mentions. Unmatched articles are dropped
//! silently; an empty result is valid.

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::Watchlist;
use crate::error::PipelineError;
use crate::ingest::types::Article;
use crate::matcher::TickerMatcher;

/// One article attributed to one ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedRow {
    pub published_time: Option<DateTime<Utc>>,
    pub source_timestamp: DateTime<Utc>,
    pub source_name: String,
    pub ticker: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub url: Option<String>,
}

impl MappedRow {
    fn from_article(a: &Article, ticker: &str) -> Self {
        Self {
            published_time: a.published_time,
            source_timestamp: a.source_timestamp,
            source_name: a.source_name.clone(),
            ticker: ticker.to_string(),
            title: a.title.clone(),
            summary: a.summary.clone(),
            body: a.body.clone(),
            url: a.url.clone(),
        }
    }

    /// Scoring unit: title, summary and body joined by single spaces.
    pub fn scoring_text(&self) -> String {
        format!("{} {} {}", self.title, self.summary, self.body)
    }

    /// Publish time if known, else fetch time.
    pub fn event_time(&self) -> DateTime<Utc> {
        self.published_time.unwrap_or(self.source_timestamp)
    }
}

/// Per-run counters, logged and exported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapStats {
    pub input: usize,
    pub duplicates: usize,
    pub stale: usize,
    pub unmatched: usize,
    pub rows: usize,
}

pub struct ArticleMapper {
    matcher: TickerMatcher,
    window: Duration,
}

impl ArticleMapper {
    /// Compiles the watchlist recognisers. An empty watchlist can never match
    /// and is rejected.
    pub fn new(watchlist: &Watchlist, window_hours: u32) -> Result<Self, PipelineError> {
        if watchlist.is_empty() {
            return Err(PipelineError::Config("watchlist has no tickers".into()));
        }
        let matcher =
            TickerMatcher::new(watchlist).map_err(|e| PipelineError::Config(format!("{e:#}")))?;
        Ok(Self {
            matcher,
            window: Duration::hours(i64::from(window_hours)),
        })
    }

    /// Map all collections relative to `now`.
    pub fn map<I>(&self, collections: I, now: DateTime<Utc>) -> Result<Vec<MappedRow>, PipelineError>
    where
        I: IntoIterator<Item = Vec<Article>>,
    {
        self.map_with_stats(collections, now).map(|(rows, _)| rows)
    }

    pub fn map_with_stats<I>(
        &self,
        collections: I,
        now: DateTime<Utc>,
    ) -> Result<(Vec<MappedRow>, MapStats), PipelineError>
    where
        I: IntoIterator<Item = Vec<Article>>,
    {
        let articles: Vec<Article> = collections.into_iter().flatten().collect();
        if articles.is_empty() {
            return Err(PipelineError::NoInput);
        }

        let mut stats = MapStats {
            input: articles.len(),
            ..MapStats::default()
        };

        let unique = dedupe(articles);
        stats.duplicates = stats.input - unique.len();

        // A window reaching past the representable range has no lower bound.
        let cutoff = now.checked_sub_signed(self.window);
        let mut rows = Vec::new();
        for a in &unique {
            if a.published_time.zip(cutoff).is_some_and(|(p, c)| p < c) {
                stats.stale += 1;
                continue;
            }
            let tickers = self.matcher.match_text(&a.text());
            if tickers.is_empty() {
                stats.unmatched += 1;
                continue;
            }
            rows.extend(tickers.iter().map(|t| MappedRow::from_article(a, t)));
        }
        stats.rows = rows.len();

        counter!("pipeline_mapped_rows_total").increment(rows.len() as u64);
        tracing::info!(
            target: "pipeline",
            input = stats.input,
            duplicates = stats.duplicates,
            stale = stats.stale,
            unmatched = stats.unmatched,
            rows = stats.rows,
            "articles mapped"
        );
        Ok((rows, stats))
    }
}

/// First occurrence wins. URL is the identity when present; articles without
/// one are deduplicated by full-record equality.
fn dedupe(articles: Vec<Article>) -> Vec<Article> {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_rows: HashSet<Article> = HashSet::new();
    let mut out = Vec::with_capacity(articles.len());
    for a in articles {
        let fresh = match a.identity_url() {
            Some(u) => seen_urls.insert(u.to_string()),
            None => seen_rows.insert(a.clone()),
        };
        if fresh {
            out.push(a);
        }
    }
    out
}
