// src/ingest/providers/csv_dir.rs
//! Raw article dumps on disk: every `*.csv` in a directory, read in file-name order.
//!
//! Accepted headers: `scraped_utc`/`timestamp_utc`, `published_utc`, `source`,
//! `title`, `summary`, `text`/`body`, `url`. Missing columns are empty.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::providers::rss::parse_feed_date;
use crate::ingest::types::{Article, ArticleSource};

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default, alias = "timestamp_utc", alias = "scraped_at")]
    scraped_utc: Option<String>,
    #[serde(default, alias = "published_at")]
    published_utc: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default, alias = "body")]
    text: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

pub struct CsvDirSource {
    dir: PathBuf,
}

impl CsvDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn csv_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("listing {}", self.dir.display()))?
        {
            let path = entry
                .with_context(|| format!("reading entry in {}", self.dir.display()))?
                .path();
            if path.extension().and_then(|s| s.to_str()) == Some("csv") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Parse one dump. Rows without a usable scrape time fall back to the
    /// file's modification time.
    pub fn read_file(path: &Path) -> Result<Vec<Article>> {
        let file_time: DateTime<Utc> = fs::metadata(path)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("opening {}", path.display()))?;

        let mut out = Vec::new();
        for (i, rec) in rdr.deserialize::<RawRecord>().enumerate() {
            let rec = rec.with_context(|| format!("{} row {}", path.display(), i + 1))?;
            let title = rec.title.unwrap_or_default().trim().to_string();
            let summary = rec.summary.unwrap_or_default().trim().to_string();
            let body = rec.text.unwrap_or_default().trim().to_string();
            if title.is_empty() && summary.is_empty() && body.is_empty() {
                continue;
            }
            out.push(Article {
                source_timestamp: rec
                    .scraped_utc
                    .as_deref()
                    .and_then(parse_feed_date)
                    .unwrap_or(file_time),
                published_time: rec.published_utc.as_deref().and_then(parse_feed_date),
                source_name: rec.source.unwrap_or_default(),
                title,
                summary,
                body,
                url: rec.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()),
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl ArticleSource for CsvDirSource {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        let mut out = Vec::new();
        let mut skipped = 0usize;
        for f in self.csv_files()? {
            let mut v = Self::read_file(&f)?;
            if v.is_empty() {
                skipped += 1;
                continue;
            }
            out.append(&mut v);
        }
        tracing::debug!(target: "ingest", dir = %self.dir.display(), skipped, "csv dumps read");
        Ok(out)
    }

    fn name(&self) -> &str {
        "csv"
    }
}
