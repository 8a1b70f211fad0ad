//! # Sentiment Annotator
//! Attaches `(score, confidence)` to every mapped row via an external scorer.
//!
//! Scoring happens in batches of `batch_size` texts; batching is a throughput
//! knob only. Results stay in input order and the output is the same for any
//! batch size. A scorer that answers with the wrong number of results, or with
//! values outside `[-1,1]` / `[0,1]`, fails the run.

pub mod http;
pub mod lexicon;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::mapper::MappedRow;

pub use http::HttpScorer;
pub use lexicon::LexiconScorer;

/// One scorer result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// Polarity in `[-1,1]`.
    pub score: f64,
    /// Model certainty in `[0,1]`.
    pub confidence: f64,
}

impl SentimentScore {
    pub fn new(score: f64, confidence: f64) -> Self {
        Self { score, confidence }
    }

    fn is_valid(&self) -> bool {
        self.score.is_finite()
            && self.confidence.is_finite()
            && (-1.0..=1.0).contains(&self.score)
            && (0.0..=1.0).contains(&self.confidence)
    }
}

/// Opaque `text → (score, confidence)` function, called in batches.
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    /// Must return exactly one result per input text, in order.
    async fn score_batch(&self, texts: &[String]) -> anyhow::Result<Vec<SentimentScore>>;
    fn name(&self) -> &str;
}

/// A mapped row with its sentiment attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRow {
    #[serde(flatten)]
    pub row: MappedRow,
    pub sentiment_score: f64,
    pub sentiment_confidence: f64,
}

/// Score every row. Zero rows never reach the scorer.
pub async fn annotate(
    rows: Vec<MappedRow>,
    scorer: &dyn SentimentScorer,
    batch_size: usize,
) -> Result<Vec<SentimentRow>, PipelineError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let batch_size = batch_size.max(1);
    let texts: Vec<String> = rows.iter().map(MappedRow::scoring_text).collect();

    let mut scores: Vec<SentimentScore> = Vec::with_capacity(texts.len());
    for (i, chunk) in texts.chunks(batch_size).enumerate() {
        let offset = i * batch_size;
        let out = scorer
            .score_batch(chunk)
            .await
            .map_err(|e| PipelineError::Scorer {
                scorer: scorer.name().to_string(),
                message: format!("{e:#}"),
            })?;
        if out.len() != chunk.len() {
            return Err(PipelineError::ScorerConsistency {
                offset,
                expected: chunk.len(),
                got: out.len(),
            });
        }
        if let Some((j, bad)) = out.iter().enumerate().find(|(_, s)| !s.is_valid()) {
            return Err(PipelineError::ScorerOutOfRange {
                index: offset + j,
                score: bad.score,
                confidence: bad.confidence,
            });
        }
        scores.extend(out);
    }

    tracing::info!(
        target: "pipeline",
        scorer = scorer.name(),
        rows = rows.len(),
        batch_size,
        "rows annotated"
    );

    Ok(rows
        .into_iter()
        .zip(scores)
        .map(|(row, s)| SentimentRow {
            row,
            sentiment_score: s.score,
            sentiment_confidence: s.confidence,
        })
        .collect())
}
