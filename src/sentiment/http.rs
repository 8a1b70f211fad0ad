//! Remote classifier scorer.
//!
//! POSTs `{"inputs": [...]}` and accepts any of these response shapes:
//! - `[[neg, neu, pos], ...]`
//! - `{"probabilities": [[neg, neu, pos], ...]}`
//! - `[[{"label": "positive", "score": 0.9}, ...], ...]`
//!
//! Probabilities map to `score = positive - negative`, `confidence = max(p)`.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{SentimentScore, SentimentScorer};

#[derive(Debug, Serialize)]
struct Req<'a> {
    inputs: &'a [String],
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ScoreResponse {
    Plain(Vec<Vec<f64>>),
    Wrapped { probabilities: Vec<Vec<f64>> },
    Labeled(Vec<Vec<LabelScore>>),
}

/// `[negative, neutral, positive]` → (pos − neg, max).
pub fn score_from_probs(neg: f64, neu: f64, pos: f64) -> SentimentScore {
    let confidence = neg.max(neu).max(pos);
    SentimentScore::new(pos - neg, confidence)
}

fn from_triplet(p: &[f64]) -> Result<SentimentScore> {
    match p {
        [neg, neu, pos] => Ok(score_from_probs(*neg, *neu, *pos)),
        other => bail!("expected 3 class probabilities, got {}", other.len()),
    }
}

fn from_labels(items: &[LabelScore]) -> Result<SentimentScore> {
    let find = |name: &str| {
        items
            .iter()
            .find(|l| l.label.eq_ignore_ascii_case(name))
            .map(|l| l.score)
            .ok_or_else(|| anyhow!("missing label `{name}`"))
    };
    Ok(score_from_probs(
        find("negative")?,
        find("neutral")?,
        find("positive")?,
    ))
}

fn decode(body: &str) -> Result<Vec<SentimentScore>> {
    let resp: ScoreResponse =
        serde_json::from_str(body.trim()).context("parse scorer response")?;
    match resp {
        ScoreResponse::Plain(v) | ScoreResponse::Wrapped { probabilities: v } => {
            v.iter().map(|p| from_triplet(p)).collect()
        }
        ScoreResponse::Labeled(v) => v.iter().map(|l| from_labels(l)).collect(),
    }
}

pub struct HttpScorer {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpScorer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("market-pulse/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()
            .context("building scorer http client")?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl SentimentScorer for HttpScorer {
    async fn score_batch(&self, texts: &[String]) -> Result<Vec<SentimentScore>> {
        let resp = self
            .http
            .post(self.endpoint.as_str())
            .json(&Req { inputs: texts })
            .send()
            .await
            .context("scorer post()")?;
        let status = resp.status();
        let body = resp.text().await.context("read scorer body")?;
        if !status.is_success() {
            bail!("scorer returned {status}: {}", body.chars().take(200).collect::<String>());
        }
        decode(&body)
    }

    fn name(&self) -> &str {
        "http"
    }
}
