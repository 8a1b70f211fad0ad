// src/config/pipeline.rs
//! Run-time tunables for one pipeline run, loaded from TOML with env overrides.
//!
//! Shape (all keys optional):
//! ```toml
//! window_hours = 120
//! batch_size = 16
//! snapshot_path = "data/processed/signals_latest.csv"
//! refresh_interval_secs = 900
//!
//! [policy]
//! buy_delta = 0.20
//! sell_delta = -0.20
//! min_volume = 2
//!
//! [scorer]
//! kind = "lexicon"            # or "http" with `endpoint = "..."`
//!
//! [[feeds]]
//! kind = "rss"
//! name = "YahooFinance"
//! url = "https://finance.yahoo.com/news/rssindex"
//! ```

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::decision::SignalPolicy;

pub const DEFAULT_PIPELINE_CONFIG_PATH: &str = "config/pipeline.toml";
pub const ENV_PIPELINE_CONFIG_PATH: &str = "MARKET_PULSE_CONFIG";

/// Upper bound for `window_hours` (ten years).
pub const MAX_WINDOW_HOURS: u32 = 24 * 366 * 10;

pub const ENV_WINDOW_HOURS: &str = "WINDOW_HOURS";
pub const ENV_BUY_DELTA: &str = "BUY_DELTA";
pub const ENV_SELL_DELTA: &str = "SELL_DELTA";
pub const ENV_MIN_VOLUME: &str = "MIN_VOLUME";
pub const ENV_BATCH_SIZE: &str = "BATCH_SIZE";
pub const ENV_SNAPSHOT_PATH: &str = "SNAPSHOT_PATH";

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Recency window in hours.
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,
    /// Texts per scorer call.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
    /// Scheduler period for `serve`.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default)]
    pub policy: SignalPolicy,
    #[serde(default)]
    pub scorer: ScorerConfig,
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedConfig>,
}

fn default_window_hours() -> u32 {
    120
}
fn default_batch_size() -> usize {
    16
}
fn default_snapshot_path() -> PathBuf {
    PathBuf::from("data/processed/signals_latest.csv")
}
fn default_refresh_interval_secs() -> u64 {
    900
}
fn default_feeds() -> Vec<FeedConfig> {
    vec![
        FeedConfig::Rss {
            name: "YahooFinance".into(),
            url: "https://finance.yahoo.com/news/rssindex".into(),
        },
        FeedConfig::Rss {
            name: "MarketWatch".into(),
            url: "https://feeds.marketwatch.com/marketwatch/topstories/".into(),
        },
    ]
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
            batch_size: default_batch_size(),
            snapshot_path: default_snapshot_path(),
            refresh_interval_secs: default_refresh_interval_secs(),
            policy: SignalPolicy::default(),
            scorer: ScorerConfig::default(),
            feeds: default_feeds(),
        }
    }
}

/// Which sentiment scorer backs the annotator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScorerConfig {
    /// Built-in lexicon scorer; offline and deterministic.
    #[default]
    Lexicon,
    /// Remote classifier returning `[negative, neutral, positive]` probabilities.
    Http {
        endpoint: String,
        #[serde(default = "default_scorer_timeout_secs")]
        timeout_secs: u64,
    },
}

fn default_scorer_timeout_secs() -> u64 {
    30
}

/// One article source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FeedConfig {
    Rss {
        name: String,
        url: String,
    },
    /// NewsAPI "everything" search, one query per watch-listed ticker.
    NewsApi {
        #[serde(default = "default_newsapi_key_env")]
        api_key_env: String,
        #[serde(default = "default_newsapi_base_url")]
        base_url: String,
    },
    /// Directory of raw article CSV dumps.
    Csv {
        dir: PathBuf,
    },
}

fn default_newsapi_key_env() -> String {
    "NEWS_API_KEY".into()
}
fn default_newsapi_base_url() -> String {
    "https://newsapi.org/v2/everything".into()
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: PipelineConfig = toml::from_str(s)?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing pipeline config {}", path.display()))
    }

    /// `$MARKET_PULSE_CONFIG`, else `config/pipeline.toml`, else defaults;
    /// then env overrides, then validation.
    pub fn load_default() -> Result<Self> {
        let mut cfg = match std::env::var(ENV_PIPELINE_CONFIG_PATH) {
            Ok(p) => Self::load_from(Path::new(&p))?,
            Err(_) => {
                let p = Path::new(DEFAULT_PIPELINE_CONFIG_PATH);
                if p.exists() {
                    Self::load_from(p)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_overrides(|k| std::env::var(k).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply overrides from a key lookup (the process env in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_env(&lookup, ENV_WINDOW_HOURS)? {
            self.window_hours = v;
        }
        if let Some(v) = parse_env(&lookup, ENV_BUY_DELTA)? {
            self.policy.buy_delta = v;
        }
        if let Some(v) = parse_env(&lookup, ENV_SELL_DELTA)? {
            self.policy.sell_delta = v;
        }
        if let Some(v) = parse_env(&lookup, ENV_MIN_VOLUME)? {
            self.policy.min_volume = v;
        }
        if let Some(v) = parse_env(&lookup, ENV_BATCH_SIZE)? {
            self.batch_size = v;
        }
        if let Some(v) = lookup(ENV_SNAPSHOT_PATH).filter(|s| !s.trim().is_empty()) {
            self.snapshot_path = PathBuf::from(v.trim());
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_hours == 0 {
            return Err(anyhow!("window_hours must be at least 1"));
        }
        if self.window_hours > MAX_WINDOW_HOURS {
            return Err(anyhow!(
                "window_hours ({}) exceeds the maximum of {MAX_WINDOW_HOURS}",
                self.window_hours
            ));
        }
        if self.batch_size == 0 {
            return Err(anyhow!("batch_size must be at least 1"));
        }
        if self.refresh_interval_secs == 0 {
            return Err(anyhow!("refresh_interval_secs must be at least 1"));
        }
        self.policy.validate().map_err(|e| anyhow!(e))?;
        Ok(())
    }
}

fn parse_env<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow!("{key}={raw:?}: {e}")),
    }
}
