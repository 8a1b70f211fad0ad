//! # Ticker Matcher
//! Maps free text to the set of watch-listed tickers it mentions.
//!
//! Each ticker gets one case-insensitive recogniser compiled from a table of
//! fragments: the bare symbol, `$SYMBOL`, `(SYMBOL)` and every alias. Symbol
//! forms must not touch an ASCII letter or digit on either side; aliases must
//! not touch a letter (so `teslas` does not match `tesla`).
//!
//! The `regex` crate has no look-around, so the guards are written as
//! consuming `(?:^|[^..])` groups. That is equivalent for a yes/no answer,
//! which is all matching needs.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeSet;

use crate::config::Watchlist;

#[derive(Debug)]
struct Recognizer {
    ticker: String,
    re: Regex,
}

/// Compiled recognisers for one watchlist; build once per run.
#[derive(Debug)]
pub struct TickerMatcher {
    recognizers: Vec<Recognizer>,
}

impl TickerMatcher {
    pub fn new(watchlist: &Watchlist) -> Result<Self> {
        let recognizers = watchlist
            .entries()
            .iter()
            .map(|e| {
                let pattern = ticker_pattern(&e.ticker, &e.aliases);
                let re = Regex::new(&pattern)
                    .with_context(|| format!("ticker `{}` pattern error", e.ticker))?;
                Ok(Recognizer {
                    ticker: e.ticker.clone(),
                    re,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { recognizers })
    }

    /// Every ticker whose recogniser fires anywhere in `text`, each at most once.
    pub fn match_text(&self, text: &str) -> BTreeSet<String> {
        if text.trim().is_empty() {
            return BTreeSet::new();
        }
        self.recognizers
            .iter()
            .filter(|r| r.re.is_match(text))
            .map(|r| r.ticker.clone())
            .collect()
    }
}

/// Alternation of all fragments for one ticker.
fn ticker_pattern(ticker: &str, aliases: &[String]) -> String {
    let t = regex::escape(&ticker.to_ascii_uppercase());
    let mut pieces = vec![format!(
        r"(?:^|[^a-z0-9])(?:\${t}|\({t}\)|{t})(?:$|[^a-z0-9])"
    )];
    for a in aliases {
        let n = regex::escape(&a.to_lowercase());
        pieces.push(format!(r"(?:^|[^a-z])(?:{n})(?:$|[^a-z])"));
    }
    format!("(?i){}", pieces.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(entries: &[(&str, &[&str])]) -> TickerMatcher {
        let wl = Watchlist::new(entries.iter().map(|(t, a)| (*t, a.iter().copied()))).unwrap();
        TickerMatcher::new(&wl).unwrap()
    }

    fn set(v: &[&str]) -> BTreeSet<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn symbol_forms_match() {
        let m = matcher(&[("TSLA", &["tesla"])]);
        for text in ["TSLA up 3%", "buy $TSLA now", "Tesla Inc. (TSLA) rallies", "tsla!"] {
            assert_eq!(m.match_text(text), set(&["TSLA"]), "text: {text}");
        }
    }

    #[test]
    fn symbol_needs_alnum_boundaries() {
        let m = matcher(&[("BA", &[])]);
        assert!(m.match_text("BASF and BAC report").is_empty());
        assert!(m.match_text("XBA2 index").is_empty());
        assert_eq!(m.match_text("shares of BA, fell"), set(&["BA"]));
    }

    #[test]
    fn alias_needs_letter_boundaries() {
        let m = matcher(&[("TSLA", &["tesla"])]);
        assert_eq!(m.match_text("Tesla delivers record Q3"), set(&["TSLA"]));
        assert!(m.match_text("teslas are popular").is_empty());
        assert!(m.match_text("a nikolatesla tribute").is_empty());
        // digits are not letters
        assert_eq!(m.match_text("tesla2025 roadmap"), set(&["TSLA"]));
    }

    #[test]
    fn multi_word_alias_and_regex_metachars() {
        let m = matcher(&[("JPM", &["jp morgan"]), ("BRK.B", &["berkshire"])]);
        assert_eq!(m.match_text("JP Morgan raises guidance"), set(&["JPM"]));
        assert_eq!(m.match_text("BRK.B slips"), set(&["BRK.B"]));
        assert!(m.match_text("BRKXB slips").is_empty());
    }

    #[test]
    fn fan_out_and_overlapping_aliases() {
        let m = matcher(&[
            ("GOOGL", &["google", "alphabet"]),
            ("GOOG", &["google"]),
            ("AAPL", &["apple"]),
        ]);
        assert_eq!(
            m.match_text("Google and Apple settle; google again"),
            set(&["AAPL", "GOOG", "GOOGL"])
        );
    }

    #[test]
    fn blank_text_matches_nothing() {
        let m = matcher(&[("TSLA", &["tesla"])]);
        assert!(m.match_text("").is_empty());
        assert!(m.match_text("   \n\t").is_empty());
    }
}
