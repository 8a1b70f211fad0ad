// src/config/watchlist.rs
use anyhow::{anyhow, bail, Context, Result};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_WATCHLIST_PATH: &str = "WATCHLIST_PATH";

/// One tracked ticker and the company-name fragments that identify it in prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchlistEntry {
    pub ticker: String,
    /// Ordered, de-duplicated, lower-cased aliases.
    pub aliases: Vec<String>,
}

/// Closed list of tracked tickers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlist {
    entries: Vec<WatchlistEntry>,
}

impl Watchlist {
    /// Validate and normalise entries: tickers are trimmed and upper-cased and
    /// must be unique and non-empty; aliases are trimmed, lower-cased and
    /// de-duplicated keeping first occurrence.
    pub fn new<I, S, A>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, A)>,
        S: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for (ticker, aliases) in entries {
            let ticker = ticker.as_ref().trim().to_ascii_uppercase();
            if ticker.is_empty() {
                bail!("watchlist contains an empty ticker");
            }
            if !seen.insert(ticker.clone()) {
                bail!("watchlist contains duplicate ticker `{ticker}`");
            }
            out.push(WatchlistEntry {
                ticker,
                aliases: clean_aliases(aliases),
            });
        }
        Ok(Self { entries: out })
    }

    /// Built-in seed: the default tracked large caps and their common names.
    pub fn default_seed() -> Self {
        let seed: [(&str, &[&str]); 13] = [
            ("AAPL", &["apple"]),
            ("TSLA", &["tesla"]),
            ("NVDA", &["nvidia"]),
            ("MSFT", &["microsoft"]),
            ("AMZN", &["amazon"]),
            ("GOOGL", &["google", "alphabet"]),
            ("META", &["meta", "facebook"]),
            ("NFLX", &["netflix"]),
            ("LLY", &["lilly", "eli lilly"]),
            ("JPM", &["jpmorgan", "jp morgan", "jamie dimon"]),
            ("BA", &["boeing"]),
            ("AMD", &["amd", "advanced micro devices"]),
            ("INTC", &["intel"]),
        ];
        let entries = seed
            .into_iter()
            .map(|(t, a)| WatchlistEntry {
                ticker: t.to_string(),
                aliases: a.iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn clean_aliases<A>(aliases: A) -> Vec<String>
where
    A: IntoIterator,
    A::Item: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for a in aliases {
        let a = a.as_ref().trim().to_lowercase();
        if !a.is_empty() && seen.insert(a.clone()) {
            out.push(a);
        }
    }
    out
}

/// Load a watchlist from an explicit path. Supports TOML or JSON.
///
/// TOML: `[tickers]` table of `TICKER = ["alias", ...]`.
/// JSON: `{"TICKER": ["alias", ...]}`.
pub fn load_watchlist_from(path: &Path) -> Result<Watchlist> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading watchlist from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_watchlist(&content, ext.as_str())
        .with_context(|| format!("parsing watchlist {}", path.display()))
}

/// Load the watchlist using env var + fallbacks:
/// 1) $WATCHLIST_PATH
/// 2) config/watchlist.toml
/// 3) config/watchlist.json
/// 4) built-in seed
pub fn load_watchlist_default() -> Result<Watchlist> {
    if let Ok(p) = std::env::var(ENV_WATCHLIST_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_watchlist_from(&pb);
        }
        return Err(anyhow!("{ENV_WATCHLIST_PATH} points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/watchlist.toml");
    if toml_p.exists() {
        return load_watchlist_from(&toml_p);
    }
    let json_p = PathBuf::from("config/watchlist.json");
    if json_p.exists() {
        return load_watchlist_from(&json_p);
    }
    Ok(Watchlist::default_seed())
}

fn parse_watchlist(s: &str, hint_ext: &str) -> Result<Watchlist> {
    if hint_ext == "json" {
        return parse_json(s);
    }
    if hint_ext == "toml" {
        return parse_toml(s);
    }
    parse_toml(s).or_else(|_| parse_json(s))
}

fn parse_toml(s: &str) -> Result<Watchlist> {
    #[derive(serde::Deserialize)]
    struct TomlWl {
        tickers: BTreeMap<String, Vec<String>>,
    }
    let v: TomlWl = toml::from_str(s)?;
    Watchlist::new(v.tickers)
}

fn parse_json(s: &str) -> Result<Watchlist> {
    let v: BTreeMap<String, Vec<String>> = serde_json::from_str(s)?;
    Watchlist::new(v)
}
