//! decision.rs — signal vocabulary, classification policy and the output row.
//!
//! `SignalRow` is the compatibility contract with the presentation layer:
//! field names are the snapshot column names and must not change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading signal for one ticker-hour bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bound of `|delta| * sqrt(volume)` before normalisation into `[0,1]`.
pub const CONFIDENCE_CAP: f64 = 3.0;

/// Classification thresholds. Kept as a value so tests and deployments can
/// move the boundaries without touching the aggregation code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalPolicy {
    /// BUY requires `delta > buy_delta`.
    #[serde(default = "default_buy_delta")]
    pub buy_delta: f64,
    /// SELL requires `delta < sell_delta` (negative).
    #[serde(default = "default_sell_delta")]
    pub sell_delta: f64,
    /// Minimum number of articles in the bucket for BUY/SELL.
    #[serde(default = "default_min_volume")]
    pub min_volume: usize,
}

fn default_buy_delta() -> f64 {
    0.20
}
fn default_sell_delta() -> f64 {
    -0.20
}
fn default_min_volume() -> usize {
    2
}

impl Default for SignalPolicy {
    fn default() -> Self {
        Self {
            buy_delta: default_buy_delta(),
            sell_delta: default_sell_delta(),
            min_volume: default_min_volume(),
        }
    }
}

impl SignalPolicy {
    /// BUY/SELL only with a known delta past the threshold and enough volume.
    /// A missing delta (first hour of a ticker) is always HOLD.
    pub fn classify(&self, delta: Option<f64>, volume: usize) -> Signal {
        let Some(d) = delta else {
            return Signal::Hold;
        };
        if volume < self.min_volume {
            return Signal::Hold;
        }
        if d > self.buy_delta {
            Signal::Buy
        } else if d < self.sell_delta {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.buy_delta.is_finite() || !self.sell_delta.is_finite() {
            return Err("signal thresholds must be finite".into());
        }
        if self.sell_delta > self.buy_delta {
            return Err(format!(
                "sell_delta ({}) must not exceed buy_delta ({})",
                self.sell_delta, self.buy_delta
            ));
        }
        Ok(())
    }
}

/// `clip(|delta| * sqrt(volume), 0, 3) / 3`; a missing delta counts as 0.
pub fn confidence(delta: Option<f64>, volume: usize) -> f64 {
    let d = delta.unwrap_or(0.0).abs();
    let raw = d * (volume as f64).sqrt();
    clamp01(raw.clamp(0.0, CONFIDENCE_CAP) / CONFIDENCE_CAP)
}

/// One aggregated ticker-hour bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub ticker: String,
    pub hour: DateTime<Utc>,
    pub avg_sentiment: f64,
    pub volume: usize,
    pub sentiment_delta: Option<f64>,
    pub signal: Signal,
    pub confidence: f64,
    pub rep_title: String,
    pub rep_url: Option<String>,
    pub rep_article_sentiment: Option<f64>,
}

/// Snapshot column order.
pub const SIGNAL_COLUMNS: [&str; 10] = [
    "ticker",
    "hour",
    "avg_sentiment",
    "volume",
    "sentiment_delta",
    "signal",
    "confidence",
    "rep_title",
    "rep_url",
    "rep_article_sentiment",
];

fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_respects_thresholds_and_volume_gate() {
        let p = SignalPolicy::default();
        assert_eq!(p.classify(Some(0.4), 2), Signal::Buy);
        assert_eq!(p.classify(Some(0.4), 1), Signal::Hold);
        assert_eq!(p.classify(Some(-0.4), 3), Signal::Sell);
        assert_eq!(p.classify(Some(-0.4), 0), Signal::Hold);
        assert_eq!(p.classify(None, 10), Signal::Hold);
    }

    #[test]
    fn thresholds_are_strict() {
        let p = SignalPolicy {
            buy_delta: 0.25,
            sell_delta: -0.25,
            min_volume: 2,
        };
        assert_eq!(p.classify(Some(0.25), 5), Signal::Hold);
        assert_eq!(p.classify(Some(0.2501), 5), Signal::Buy);
        assert_eq!(p.classify(Some(-0.25), 5), Signal::Hold);
        assert_eq!(p.classify(Some(-0.2501), 5), Signal::Sell);
    }

    #[test]
    fn confidence_formula_and_cap() {
        let c = confidence(Some(0.4), 4);
        assert!((c - 0.2667).abs() < 1e-3, "got {c}");
        assert_eq!(confidence(None, 50), 0.0);
        assert_eq!(confidence(Some(-2.0), 9), 1.0);
    }

    #[test]
    fn signal_serializes_as_uppercase_literal() {
        assert_eq!(serde_json::to_string(&Signal::Buy).unwrap(), "\"BUY\"");
        assert_eq!(Signal::Sell.to_string(), "SELL");
        let s: Signal = serde_json::from_str("\"HOLD\"").unwrap();
        assert_eq!(s, Signal::Hold);
    }

    #[test]
    fn policy_validation_rejects_inverted_thresholds() {
        let p = SignalPolicy {
            buy_delta: -0.1,
            sell_delta: 0.1,
            min_volume: 2,
        };
        assert!(p.validate().is_err());
        assert!(SignalPolicy::default().validate().is_ok());
    }
}
