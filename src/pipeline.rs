//! One end-to-end run: collect → map → annotate → aggregate → write snapshot.
//!
//! Any failure aborts before the snapshot is written, so the last good table
//! stays in place.

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{PipelineConfig, ScorerConfig, Watchlist};
use crate::decision::SignalRow;
use crate::engine;
use crate::error::PipelineError;
use crate::ingest::{self, providers, types::ArticleSource};
use crate::mapper::{ArticleMapper, MapStats};
use crate::sentiment::{self, HttpScorer, LexiconScorer, SentimentScorer};
use crate::snapshot;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("pipeline_runs_total", "Pipeline runs started.");
        describe_counter!("pipeline_failures_total", "Pipeline runs aborted, by kind.");
        describe_counter!(
            "pipeline_mapped_rows_total",
            "(article, ticker) rows produced by the mapper."
        );
        describe_gauge!("pipeline_signal_rows", "Rows in the last written snapshot.");
        describe_gauge!(
            "pipeline_last_success_ts",
            "Unix ts of the last successful run."
        );
    });
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub articles: usize,
    pub mapping: MapStats,
    pub signal_rows: usize,
    pub snapshot_path: PathBuf,
}

pub struct Pipeline {
    config: PipelineConfig,
    watchlist: Watchlist,
    sources: Vec<Box<dyn ArticleSource>>,
    scorer: Arc<dyn SentimentScorer>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        watchlist: Watchlist,
        sources: Vec<Box<dyn ArticleSource>>,
        scorer: Arc<dyn SentimentScorer>,
    ) -> Self {
        Self {
            config,
            watchlist,
            sources,
            scorer,
        }
    }

    /// Build sources and scorer from configuration.
    pub fn from_config(config: PipelineConfig, watchlist: Watchlist) -> anyhow::Result<Self> {
        let sources = providers::build_sources(&config.feeds, &watchlist, config.window_hours)?;
        let scorer: Arc<dyn SentimentScorer> = match &config.scorer {
            ScorerConfig::Lexicon => Arc::new(LexiconScorer::new()),
            ScorerConfig::Http {
                endpoint,
                timeout_secs,
            } => Arc::new(HttpScorer::new(
                endpoint.clone(),
                Duration::from_secs(*timeout_secs),
            )?),
        };
        Ok(Self::new(config, watchlist, sources, scorer))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Compute the signal table without touching the snapshot.
    pub async fn compute(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(Vec<SignalRow>, usize, MapStats), PipelineError> {
        let articles = ingest::collect_articles(&self.sources).await?;
        let n_articles = articles.len();

        let mapper = ArticleMapper::new(&self.watchlist, self.config.window_hours)?;
        let (mapped, stats) = mapper.map_with_stats([articles], now)?;

        let scored =
            sentiment::annotate(mapped, self.scorer.as_ref(), self.config.batch_size).await?;
        let table = engine::aggregate(&scored, &self.config.policy)?;
        Ok((table, n_articles, stats))
    }

    /// Compute and atomically replace the snapshot.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<RunReport, PipelineError> {
        ensure_metrics_described();
        counter!("pipeline_runs_total").increment(1);

        let result = async {
            let (table, articles, mapping) = self.compute(now).await?;
            snapshot::write_snapshot(&self.config.snapshot_path, &table)?;
            Ok::<_, PipelineError>(RunReport {
                articles,
                mapping,
                signal_rows: table.len(),
                snapshot_path: self.config.snapshot_path.clone(),
            })
        }
        .await;

        match &result {
            Ok(r) => {
                gauge!("pipeline_signal_rows").set(r.signal_rows as f64);
                gauge!("pipeline_last_success_ts").set(now.timestamp() as f64);
                tracing::info!(
                    target: "pipeline",
                    articles = r.articles,
                    mapped = r.mapping.rows,
                    signals = r.signal_rows,
                    path = %r.snapshot_path.display(),
                    "pipeline run complete"
                );
            }
            Err(e) => {
                counter!("pipeline_failures_total", "kind" => e.kind()).increment(1);
                tracing::warn!(target: "pipeline", error = %e, kind = e.kind(), "pipeline run aborted; snapshot left unchanged");
            }
        }
        result
    }
}
