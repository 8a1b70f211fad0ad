// src/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::pipeline::Pipeline;

/// Re-run the pipeline on a fixed period from a single task, so runs in this
/// process never overlap. Failed runs are logged and leave the snapshot as is.
pub fn spawn_pipeline_scheduler(pipeline: Arc<Pipeline>, interval_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match pipeline.run_once(Utc::now()).await {
                Ok(report) => tracing::debug!(
                    target: "scheduler",
                    signals = report.signal_rows,
                    "scheduled run ok"
                ),
                Err(e) => tracing::debug!(target: "scheduler", error = %e, "scheduled run failed"),
            }
        }
    })
}
