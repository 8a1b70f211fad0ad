//! # Signal Engine
//! Pure aggregation of sentiment rows into the hourly signal table.
//! No I/O, suitable for unit tests and offline re-runs.
//!
//! Rows are bucketed by `(ticker, hour)` where the hour is the publish time
//! (fetch time when unknown) floored to the UTC hour. Each bucket yields mean
//! sentiment, volume, a representative article and, relative to the previous
//! bucket of the same ticker, a delta that drives the BUY/SELL/HOLD signal.
//!
//! Output is ordered by ticker then hour, and identical input always yields
//! identical output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::decision::{confidence, SignalPolicy, SignalRow};
use crate::error::PipelineError;
use crate::sentiment::SentimentRow;

/// Floor a timestamp to the start of its UTC hour.
pub fn floor_to_hour(t: DateTime<Utc>) -> DateTime<Utc> {
    let secs = t.timestamp();
    DateTime::from_timestamp(secs - secs.rem_euclid(3600), 0).unwrap_or(t)
}

struct Bucket<'a> {
    sum: f64,
    count: usize,
    rep: &'a SentimentRow,
}

impl<'a> Bucket<'a> {
    fn new(first: &'a SentimentRow) -> Self {
        Self {
            sum: first.sentiment_score,
            count: 1,
            rep: first,
        }
    }

    fn push(&mut self, r: &'a SentimentRow) {
        self.sum += r.sentiment_score;
        self.count += 1;
        if outranks(r, self.rep) {
            self.rep = r;
        }
    }
}

/// Representative order: larger `|score|` wins; on a tie the earlier event
/// time wins; on a full tie the row seen first stays.
fn outranks(candidate: &SentimentRow, current: &SentimentRow) -> bool {
    let a = candidate.sentiment_score.abs();
    let b = current.sentiment_score.abs();
    if a != b {
        return a > b;
    }
    candidate.row.event_time() < current.row.event_time()
}

/// Aggregate sentiment rows into one `SignalRow` per ticker-hour.
pub fn aggregate(
    rows: &[SentimentRow],
    policy: &SignalPolicy,
) -> Result<Vec<SignalRow>, PipelineError> {
    if rows.is_empty() {
        return Err(PipelineError::NoSentimentData);
    }

    // BTreeMap keeps (ticker, hour) ascending, which is also the delta order.
    let mut buckets: BTreeMap<(&str, DateTime<Utc>), Bucket<'_>> = BTreeMap::new();
    for r in rows {
        let key = (r.row.ticker.as_str(), floor_to_hour(r.row.event_time()));
        buckets
            .entry(key)
            .and_modify(|b| b.push(r))
            .or_insert_with(|| Bucket::new(r));
    }

    let mut out = Vec::with_capacity(buckets.len());
    let mut prev: Option<(&str, f64)> = None;
    for ((ticker, hour), b) in buckets {
        let avg = b.sum / b.count as f64;
        let delta = match prev {
            Some((t, p)) if t == ticker => Some(avg - p),
            _ => None,
        };
        prev = Some((ticker, avg));

        out.push(SignalRow {
            ticker: ticker.to_string(),
            hour,
            avg_sentiment: avg,
            volume: b.count,
            sentiment_delta: delta,
            signal: policy.classify(delta, b.count),
            confidence: confidence(delta, b.count),
            rep_title: b.rep.row.title.clone(),
            rep_url: b.rep.row.url.clone(),
            rep_article_sentiment: Some(b.rep.sentiment_score),
        });
    }

    tracing::info!(target: "pipeline", rows = rows.len(), buckets = out.len(), "signals aggregated");
    Ok(out)
}

/// Most recent bucket per ticker, ordered by ticker.
pub fn latest_per_ticker(rows: &[SignalRow]) -> Vec<SignalRow> {
    let mut latest: BTreeMap<&str, &SignalRow> = BTreeMap::new();
    for r in rows {
        latest
            .entry(r.ticker.as_str())
            .and_modify(|cur| {
                if r.hour > cur.hour {
                    *cur = r;
                }
            })
            .or_insert(r);
    }
    latest.into_values().cloned().collect()
}

/// Per-ticker overview line: the latest bucket plus window-wide coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerOverview {
    #[serde(flatten)]
    pub latest: SignalRow,
    /// Articles across every bucket of the ticker.
    pub articles_window: usize,
    /// Distinct hours with at least one article.
    pub hours_covered: usize,
}

/// Latest bucket per ticker with coverage counts, strongest sentiment first
/// (ties by ticker).
pub fn overview(rows: &[SignalRow]) -> Vec<TickerOverview> {
    let mut coverage: BTreeMap<&str, (usize, BTreeSet<DateTime<Utc>>)> = BTreeMap::new();
    for r in rows {
        let (articles, hours) = coverage.entry(r.ticker.as_str()).or_default();
        *articles += r.volume;
        hours.insert(r.hour);
    }

    let mut out: Vec<TickerOverview> = latest_per_ticker(rows)
        .into_iter()
        .map(|latest| {
            let (articles_window, hours_covered) = coverage
                .get(latest.ticker.as_str())
                .map(|(a, h)| (*a, h.len()))
                .unwrap_or_default();
            TickerOverview {
                latest,
                articles_window,
                hours_covered,
            }
        })
        .collect();
    out.sort_by(|a, b| {
        b.latest
            .avg_sentiment
            .total_cmp(&a.latest.avg_sentiment)
            .then_with(|| a.latest.ticker.cmp(&b.latest.ticker))
    });
    out
}

/// All buckets of one ticker, hour ascending. Ticker comparison ignores case.
pub fn history_for(rows: &[SignalRow], ticker: &str) -> Vec<SignalRow> {
    let mut v: Vec<SignalRow> = rows
        .iter()
        .filter(|r| r.ticker.eq_ignore_ascii_case(ticker))
        .cloned()
        .collect();
    v.sort_by_key(|r| r.hour);
    v
}
