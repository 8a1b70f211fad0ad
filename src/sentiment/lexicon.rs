use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::{SentimentScore, SentimentScorer};

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Normalisation constant for the compound score (`s / sqrt(s² + ALPHA)`).
const ALPHA: f64 = 15.0;

/// Offline scorer over a financial word list with simple negation handling.
#[derive(Debug, Clone, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Returns (raw sum, number of sentiment-bearing tokens).
    /// A negator in the previous 1..=3 tokens flips the word's sign.
    pub fn raw_score(&self, text: &str) -> (i32, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;
        let mut hits = 0usize;

        for i in 0..tokens.len() {
            let base = self.word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
            hits += 1;
        }

        (score, hits)
    }

    /// Compound polarity in `[-1,1]`; confidence grows with the number of
    /// sentiment-bearing tokens (`hits / (hits + 1)`), 0 when none.
    pub fn score_text(&self, text: &str) -> SentimentScore {
        let (raw, hits) = self.raw_score(text);
        let s = f64::from(raw);
        let score = if raw == 0 { 0.0 } else { s / (s * s + ALPHA).sqrt() };
        let confidence = hits as f64 / (hits as f64 + 1.0);
        SentimentScore::new(score.clamp(-1.0, 1.0), confidence)
    }
}

#[async_trait]
impl SentimentScorer for LexiconScorer {
    async fn score_batch(&self, texts: &[String]) -> anyhow::Result<Vec<SentimentScore>> {
        Ok(texts.iter().map(|t| self.score_text(t)).collect())
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

/// Alphanumeric, lower-cased tokens.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

/// Contractions arrive split on the apostrophe, so their stems are listed too.
fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "without"
            | "cannot"
            | "isn"
            | "wasn"
            | "aren"
            | "weren"
            | "doesn"
            | "didn"
            | "don"
            | "hasn"
            | "haven"
            | "hardly"
    )
}
