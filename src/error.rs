//! Run-level error taxonomy.
//!
//! Every variant aborts the whole run before the snapshot is touched, so the
//! presentation layer keeps reading the last complete table.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// No raw articles were supplied by any source.
    #[error("no raw articles available")]
    NoInput,

    /// Nothing reached the aggregation stage (for example every article was
    /// stale or unmatched).
    #[error("no sentiment rows to aggregate")]
    NoSentimentData,

    /// The scorer returned a different number of results than texts sent.
    #[error("scorer returned {got} results for {expected} texts (batch starting at row {offset})")]
    ScorerConsistency {
        offset: usize,
        expected: usize,
        got: usize,
    },

    /// The scorer returned a value outside `[-1,1]` / `[0,1]` or a non-finite one.
    #[error("scorer returned invalid values for row {index}: score={score}, confidence={confidence}")]
    ScorerOutOfRange {
        index: usize,
        score: f64,
        confidence: f64,
    },

    #[error("article source `{source_name}` failed: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    #[error("sentiment scorer `{scorer}` failed: {message}")]
    Scorer { scorer: String, message: String },

    #[error("snapshot I/O failed: {0}")]
    SnapshotIo(#[from] std::io::Error),

    #[error("snapshot encoding failed: {0}")]
    SnapshotFormat(#[from] csv::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    /// Short, stable label used as a metrics tag.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::NoInput => "no_input",
            PipelineError::NoSentimentData => "no_sentiment_data",
            PipelineError::ScorerConsistency { .. } => "scorer_consistency",
            PipelineError::ScorerOutOfRange { .. } => "scorer_out_of_range",
            PipelineError::Source { .. } => "source",
            PipelineError::Scorer { .. } => "scorer",
            PipelineError::SnapshotIo(_) | PipelineError::SnapshotFormat(_) => "snapshot",
            PipelineError::Config(_) => "config",
        }
    }
}
