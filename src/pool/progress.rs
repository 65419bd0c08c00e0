//! Periodic progress logging while validation runs.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::Shared;
use crate::config::LOGGING_INTERVAL;

/// Logs how many candidates have been probed so far.
pub(super) fn log_progress(start_time: Instant, shared: &Shared) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let completed = shared.completed.load(Ordering::SeqCst);
    let rate = if elapsed_secs > 0.0 {
        completed as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Probed {}/{} candidates ({} active, {} failed) in {:.2} seconds (~{:.2}/sec)",
        completed,
        shared.candidates.len(),
        shared.active.load(Ordering::SeqCst),
        shared.failed.load(Ordering::SeqCst),
        elapsed_secs,
        rate
    );
}

/// Spawns a task that logs progress every `LOGGING_INTERVAL` seconds until
/// `cancel` fires.
pub(super) fn spawn_progress_logger(
    start_time: Instant,
    shared: Arc<Shared>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(LOGGING_INTERVAL));
        // the first tick completes immediately
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => log_progress(start_time, &shared),
                _ = cancel.cancelled() => break,
            }
        }
    })
}
