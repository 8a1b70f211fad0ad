// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod mapper;
pub mod matcher;
pub mod metrics;
pub mod pipeline;
pub mod scheduler;
pub mod sentiment;
pub mod snapshot;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::config::{PipelineConfig, Watchlist};
pub use crate::decision::{Signal, SignalPolicy, SignalRow};
pub use crate::engine::aggregate;
pub use crate::error::PipelineError;
pub use crate::ingest::types::{Article, ArticleSource};
pub use crate::mapper::{ArticleMapper, MappedRow};
pub use crate::matcher::TickerMatcher;
pub use crate::pipeline::{Pipeline, RunReport};
pub use crate::sentiment::{annotate, SentimentRow, SentimentScore, SentimentScorer};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialise logging: `RUST_LOG` filter (default `market_pulse=info,warn` plus
/// the `pipeline`/`ingest` targets),
/// compact output, or JSON lines when `LOG_FORMAT=json`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("market_pulse=info,pipeline=info,ingest=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if let Err(e) = res {
        eprintln!("tracing already initialised: {e}");
    }
}
