//! Check-all job workflow.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Result};
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::api::CheckJob;
use crate::app::{
    log_job_progress, print_job_statistics, shutdown_gracefully, spawn_progress_logger,
};
use crate::config::PROGRESS_LOG_INTERVAL;
use crate::job::{spawn_scoped, CheckAllPoller, PollOutcome, PollerState};
use crate::status_server::{start_status_server, StatusState};

use super::resources::ClientResources;

/// What `run_check_all` should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckAllMode {
    /// Start a new job; with `wait` follow it until it ends.
    Start { wait: bool },
    /// Follow a job that is already pending or running.
    Resume,
    /// Cancel the job that is currently running.
    Cancel,
}

/// Results of a check-all workflow.
#[derive(Debug, Clone)]
pub struct CheckAllReport {
    /// Id of the job acted on
    pub job_id: Option<String>,
    /// How polling ended (`Idle` when nothing was polled)
    pub outcome: PollOutcome,
    /// Last snapshot of the job, if one was fetched
    pub job: Option<CheckJob>,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

/// Starts, resumes or cancels a check-all job.
///
/// While following a job, progress is logged periodically and, with a status
/// port configured, served on `/status`. Cancelling `resources.cancel` stops
/// following; the job keeps running on the server.
///
/// # Errors
///
/// Returns an error if the job cannot be started or cancelled, or when
/// `Resume`/`Cancel` find no active job.
pub async fn run_check_all(
    resources: &ClientResources,
    mode: CheckAllMode,
) -> Result<CheckAllReport> {
    let start_time = Instant::now();
    let poller = Arc::new(CheckAllPoller::from_config(
        resources.api.clone(),
        resources.cache.clone(),
        &resources.config,
    ));

    let job_id = match mode {
        CheckAllMode::Start { wait } => {
            let job_id = poller.start().await?;
            if !wait {
                info!("Check-all job {} started in the background", job_id);
                return Ok(CheckAllReport {
                    job_id: Some(job_id),
                    outcome: PollOutcome::Idle,
                    job: poller.state().job,
                    elapsed_seconds: start_time.elapsed().as_secs_f64(),
                });
            }
            job_id
        }
        CheckAllMode::Resume | CheckAllMode::Cancel => match poller.resume().await? {
            Some(job) => job.job_id,
            None => bail!("No check-all job is running"),
        },
    };

    if mode == CheckAllMode::Cancel {
        let guard = spawn_scoped(poller.clone(), &resources.cancel);
        poller.cancel().await?;
        let outcome = guard.join().await;
        let job = last_job(&outcome, &poller);
        if let Some(job) = &job {
            print_job_statistics(job);
        }
        return Ok(CheckAllReport {
            job_id: Some(job_id),
            outcome,
            job,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        });
    }

    let status_server = resources.config.status_port.map(|port| {
        let state = StatusState::new().with_check_all(poller.subscribe());
        tokio::spawn(async move {
            if let Err(e) = start_status_server(port, state).await {
                warn!("Status server error: {}", e);
            }
        })
    });

    let logger_cancel = CancellationToken::new();
    let logging_task = spawn_progress_logger(
        poller.subscribe(),
        PROGRESS_LOG_INTERVAL,
        logger_cancel.clone(),
        |state: &PollerState| log_job_progress(state),
    );

    let outcome = spawn_scoped(poller.clone(), &resources.cancel).join().await;

    shutdown_gracefully(logger_cancel, Some(logging_task), status_server).await;

    match &outcome {
        PollOutcome::Stopped => {
            info!(
                "Stopped following check-all job {}; it keeps running on the server",
                job_id
            );
        }
        PollOutcome::Vanished => warn!("Check-all job {} disappeared from the server", job_id),
        PollOutcome::Unauthorized => {
            bail!(
                "Stopped following check-all job {}: {}",
                job_id,
                poller.state().last_error.unwrap_or_default()
            );
        }
        _ => {}
    }

    let job = last_job(&outcome, &poller);
    if let Some(job) = &job {
        if job.status.is_terminal() {
            print_job_statistics(job);
        }
    }

    Ok(CheckAllReport {
        job_id: Some(job_id),
        outcome,
        job,
        elapsed_seconds: start_time.elapsed().as_secs_f64(),
    })
}

fn last_job(outcome: &PollOutcome, poller: &CheckAllPoller) -> Option<CheckJob> {
    match outcome {
        PollOutcome::Finished(job) => Some(job.clone()),
        PollOutcome::Dismissed(job) => job.clone(),
        _ => poller.state().job,
    }
}
