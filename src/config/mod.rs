// src/config/mod.rs
//! Configuration values threaded explicitly into each pipeline stage.

pub mod pipeline;
pub mod watchlist;

pub use pipeline::{FeedConfig, PipelineConfig, ScorerConfig};
pub use watchlist::{load_watchlist_default, load_watchlist_from, Watchlist, WatchlistEntry};
