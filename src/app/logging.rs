//! Progress logging utilities.

use std::time::{Duration, Instant};

use log::info;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::import::ImportRun;
use crate::job::{PollerPhase, PollerState};

/// Logs progress information about an import run.
pub fn log_import_progress(run: &ImportRun, start_time: Instant) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        run.current_offset as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Imported {}/{} addresses ({:.0}%): {} added, {} skipped, {} errors (~{:.1} addr/sec)",
        run.current_offset,
        run.total,
        run.percent(),
        run.added,
        run.skipped,
        run.errors,
        rate
    );
}

/// Logs progress information about a check-all job.
pub fn log_job_progress(state: &PollerState) {
    match (&state.job, state.phase) {
        (Some(job), PollerPhase::Polling) => info!(
            "Check-all job {}: {} {:.0}% ({}/{} checked, {} clean, {} blacklisted, {} errors)",
            job.job_id,
            job.status,
            job.progress,
            job.checked,
            job.total,
            job.clean,
            job.blacklisted,
            job.errors
        ),
        (_, PollerPhase::Starting) => info!("Starting check-all job..."),
        (_, PollerPhase::Resuming) => info!("Looking for a running check-all job..."),
        _ => {}
    }
}

/// Spawns a task that logs every published value of `rx`, at most once per
/// `interval`, until `cancel` fires or the sender is dropped.
///
/// The first value and values that differ after the interval are logged.
pub fn spawn_progress_logger<T, F>(
    mut rx: watch::Receiver<T>,
    interval: Duration,
    cancel: CancellationToken,
    log_fn: F,
) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&T) + Send + 'static,
{
    tokio::spawn(async move {
        let mut last_logged: Option<Instant> = None;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let value = rx.borrow_and_update().clone();
                    if last_logged.map_or(true, |t| t.elapsed() >= interval) {
                        log_fn(&value);
                        last_logged = Some(Instant::now());
                    }
                }
            }
        }
    })
}
