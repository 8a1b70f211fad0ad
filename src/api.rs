//! Read-only HTTP surface over the last written snapshot.
//!
//! - `GET /health`
//! - `GET /signals`            full table
//! - `GET /signals/latest`     newest bucket per ticker with coverage counts
//! - `GET /signals/{ticker}`   one ticker's history

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::decision::SignalRow;
use crate::engine::{self, TickerOverview};
use crate::snapshot;

#[derive(Clone)]
pub struct AppState {
    snapshot_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: Arc::new(snapshot_path.into()),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// No snapshot has been written yet, or it cannot be read.
    SnapshotUnavailable(String),
    UnknownTicker(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::SnapshotUnavailable(msg) => {
                tracing::warn!(target: "api", error = %msg, "snapshot unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, "snapshot unavailable").into_response()
            }
            ApiError::UnknownTicker(t) => {
                (StatusCode::NOT_FOUND, format!("no signals for `{t}`")).into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/signals", get(all_signals))
        .route("/signals/latest", get(latest_signals))
        .route("/signals/{ticker}", get(ticker_history))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn load(state: &AppState) -> Result<Vec<SignalRow>, ApiError> {
    let path = state.snapshot_path.clone();
    tokio::task::spawn_blocking(move || snapshot::read_snapshot(&path))
        .await
        .map_err(|e| ApiError::SnapshotUnavailable(e.to_string()))?
        .map_err(|e| ApiError::SnapshotUnavailable(e.to_string()))
}

async fn all_signals(State(state): State<AppState>) -> Result<Json<Vec<SignalRow>>, ApiError> {
    Ok(Json(load(&state).await?))
}

async fn latest_signals(
    State(state): State<AppState>,
) -> Result<Json<Vec<TickerOverview>>, ApiError> {
    let rows = load(&state).await?;
    Ok(Json(engine::overview(&rows)))
}

async fn ticker_history(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<Vec<SignalRow>>, ApiError> {
    let rows = load(&state).await?;
    let hist = engine::history_for(&rows, &ticker);
    if hist.is_empty() {
        return Err(ApiError::UnknownTicker(ticker));
    }
    Ok(Json(hist))
}
