//! market-pulse — binary entrypoint.
//!
//! `market-pulse run`    one pipeline run, writes the snapshot, exits non-zero on failure.
//! `market-pulse serve`  HTTP API over the snapshot plus a periodic pipeline scheduler.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;

use market_pulse::api::{self, AppState};
use market_pulse::config::{load_watchlist_default, PipelineConfig};
use market_pulse::metrics::Metrics;
use market_pulse::pipeline::Pipeline;
use market_pulse::scheduler::spawn_pipeline_scheduler;

const ENV_BIND_ADDR: &str = "BIND_ADDR";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    market_pulse::init_tracing();

    let cmd = std::env::args().nth(1).unwrap_or_else(|| "run".to_string());

    let config = PipelineConfig::load_default().context("loading pipeline config")?;
    let watchlist = load_watchlist_default().context("loading watchlist")?;
    tracing::info!(
        tickers = watchlist.len(),
        feeds = config.feeds.len(),
        window_hours = config.window_hours,
        "configuration loaded"
    );

    match cmd.as_str() {
        "run" => run(config, watchlist).await,
        "serve" => serve(config, watchlist).await,
        other => bail!("unknown command `{other}` (expected `run` or `serve`)"),
    }
}

async fn run(config: PipelineConfig, watchlist: market_pulse::Watchlist) -> Result<()> {
    let pipeline = Pipeline::from_config(config, watchlist)?;
    let report = pipeline.run_once(Utc::now()).await?;
    println!(
        "Saved -> {} ({} rows)",
        report.snapshot_path.display(),
        report.signal_rows
    );
    Ok(())
}

async fn serve(config: PipelineConfig, watchlist: market_pulse::Watchlist) -> Result<()> {
    let metrics = Metrics::init()?;
    let snapshot_path = config.snapshot_path.clone();
    let interval = config.refresh_interval_secs;

    let pipeline = Arc::new(Pipeline::from_config(config, watchlist)?);
    let _scheduler = spawn_pipeline_scheduler(pipeline, interval);

    let app = api::router(AppState::new(snapshot_path)).merge(metrics.router());

    let addr: SocketAddr = std::env::var(ENV_BIND_ADDR)
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .context("parsing BIND_ADDR")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "serving signals");
    axum::serve(listener, app).await.context("http server")?;
    Ok(())
}
