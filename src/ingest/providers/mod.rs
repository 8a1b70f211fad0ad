// src/ingest/providers/mod.rs
pub mod csv_dir;
pub mod newsapi;
pub mod rss;

use anyhow::{Context, Result};

use crate::config::{FeedConfig, Watchlist};
use crate::ingest::types::ArticleSource;

/// Instantiate the configured sources in declaration order.
pub fn build_sources(
    feeds: &[FeedConfig],
    watchlist: &Watchlist,
    window_hours: u32,
) -> Result<Vec<Box<dyn ArticleSource>>> {
    let mut out: Vec<Box<dyn ArticleSource>> = Vec::with_capacity(feeds.len());
    for f in feeds {
        match f {
            FeedConfig::Rss { name, url } => {
                out.push(Box::new(rss::RssSource::from_url(name.clone(), url.clone())?));
            }
            FeedConfig::NewsApi {
                api_key_env,
                base_url,
            } => {
                let key = std::env::var(api_key_env)
                    .with_context(|| format!("missing {api_key_env} env var"))?;
                out.push(Box::new(newsapi::NewsApiSource::new(
                    base_url.clone(),
                    key,
                    watchlist,
                    window_hours,
                )?));
            }
            FeedConfig::Csv { dir } => {
                out.push(Box::new(csv_dir::CsvDirSource::new(dir.clone())));
            }
        }
    }
    Ok(out)
}
