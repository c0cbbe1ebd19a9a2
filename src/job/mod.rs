//! Check-all job tracking.
//!
//! A check-all job runs on the server; the client only starts it, watches it
//! and may ask for it to be cancelled. `CheckAllPoller` owns the single
//! polling loop for a job and publishes `PollerState` on a `watch` channel,
//! so any number of observers share one stream of snapshots instead of
//! polling on their own.
//!
//! The loop (`run`) issues one status request per interval, never two at a
//! time, and ends when:
//! - the job reaches a terminal status (`PollOutcome::Finished`)
//! - the server answers 404 for it (`PollOutcome::Vanished`)
//! - `cancel`/`dismiss` cleared the handle (`PollOutcome::Dismissed`)
//! - the server rejects the API key (`PollOutcome::Unauthorized`)
//! - its token is cancelled (`PollOutcome::Stopped`)
//!
//! A rejected key has already expired the session, so the handle is dropped
//! without touching the caches. In the first three cases the address list, stats and activity caches are
//! invalidated once. Other polling errors are logged and polling continues.

mod guard;
mod types;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::api::{Ack, ApiClient, CheckJob, JobStatus};
use crate::cache::{CacheKey, QueryCache};
use crate::config::Config;
use crate::error_handling::{ApiError, ErrorKind};

pub use guard::{spawn, spawn_scoped, PollerGuard};
pub use types::{PollOutcome, PollerPhase, PollerState};

/// Starts, resumes, polls and cancels a server-side check-all job.
pub struct CheckAllPoller {
    api: Arc<ApiClient>,
    cache: Arc<QueryCache>,
    interval: Duration,
    handle: Mutex<Option<String>>,
    cancel_requested: AtomicBool,
    state: watch::Sender<PollerState>,
}

impl CheckAllPoller {
    pub fn new(api: Arc<ApiClient>, cache: Arc<QueryCache>, interval: Duration) -> Self {
        let (state, _) = watch::channel(PollerState::default());
        Self {
            api,
            cache,
            interval,
            handle: Mutex::new(None),
            cancel_requested: AtomicBool::new(false),
            state,
        }
    }

    pub fn from_config(api: Arc<ApiClient>, cache: Arc<QueryCache>, config: &Config) -> Self {
        Self::new(api, cache, config.poll_interval())
    }

    pub fn subscribe(&self) -> watch::Receiver<PollerState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> PollerState {
        self.state.borrow().clone()
    }

    /// Id of the job being tracked, if any.
    pub fn job_id(&self) -> Option<String> {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_handle(&self, job_id: Option<String>) {
        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = job_id;
    }

    /// Clears the handle only if it still points at `job_id`.
    fn clear_handle_if(&self, job_id: &str) {
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if handle.as_deref() == Some(job_id) {
            *handle = None;
        }
    }

    fn publish(&self, update: impl FnOnce(&mut PollerState)) {
        self.state.send_modify(update);
    }

    /// Publishes a fresh snapshot of the tracked job.
    ///
    /// While the job is running the published progress never goes down, even
    /// if a late response reports less than an earlier one.
    fn publish_snapshot(&self, mut job: CheckJob) -> CheckJob {
        self.state.send_modify(|state| {
            if let Some(prev) = &state.job {
                if prev.job_id == job.job_id
                    && job.status == JobStatus::Running
                    && job.progress < prev.progress
                {
                    job.progress = prev.progress;
                }
            }
            state.job_id = Some(job.job_id.clone());
            state.job = Some(job.clone());
            state.last_error = None;
        });
        job
    }

    fn invalidate_caches(&self) {
        self.cache.invalidate_many(&CacheKey::LIST_FAMILIES);
    }

    /// Attaches to a job already pending or running on the server.
    ///
    /// Returns the adopted job, or `None` when there is nothing to resume.
    pub async fn resume(&self) -> Result<Option<CheckJob>, ApiError> {
        if let Some(id) = self.job_id() {
            debug!("Already tracking check-all job {}", id);
            return Ok(self.state().job);
        }
        self.publish(|s| s.phase = PollerPhase::Resuming);

        match self.api.current_check_job().await {
            Ok(Some(job)) if job.status.is_active() => {
                info!("Resuming check-all job {} ({})", job.job_id, job.status);
                self.cancel_requested.store(false, Ordering::SeqCst);
                self.set_handle(Some(job.job_id.clone()));
                let job = self.publish_snapshot(job);
                self.publish(|s| s.phase = PollerPhase::Polling);
                Ok(Some(job))
            }
            Ok(_) => {
                debug!("No active check-all job to resume");
                self.publish(|s| *s = PollerState::default());
                Ok(None)
            }
            Err(e) => {
                self.publish(|s| {
                    *s = PollerState {
                        last_error: Some(e.user_message()),
                        ..PollerState::default()
                    }
                });
                Err(e)
            }
        }
    }

    /// Starts a new check-all job and begins tracking it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if a job is already tracked, or the
    /// backend error if the job could not be started. Either way no job is
    /// tracked afterwards unless one already was.
    pub async fn start(&self) -> Result<String, ApiError> {
        if let Some(id) = self.job_id() {
            return Err(ApiError::Validation(format!(
                "A check-all job is already running ({})",
                id
            )));
        }
        self.publish(|s| {
            *s = PollerState {
                phase: PollerPhase::Starting,
                ..PollerState::default()
            }
        });

        match self.api.start_check_all().await {
            Ok(resp) => {
                info!(
                    "Started check-all job {}{}",
                    resp.job_id,
                    resp.total
                        .map(|t| format!(" for {} addresses", t))
                        .unwrap_or_default()
                );
                self.cancel_requested.store(false, Ordering::SeqCst);
                self.set_handle(Some(resp.job_id.clone()));
                let job = CheckJob {
                    job_id: resp.job_id.clone(),
                    status: JobStatus::Pending,
                    total: resp.total.unwrap_or(0),
                    remaining: resp.total.unwrap_or(0),
                    ..CheckJob::default()
                };
                self.publish_snapshot(job);
                self.publish(|s| s.phase = PollerPhase::Polling);
                Ok(resp.job_id)
            }
            Err(e) => {
                warn!("Failed to start check-all job: {}", e);
                self.publish(|s| {
                    *s = PollerState {
                        last_error: Some(e.user_message()),
                        ..PollerState::default()
                    }
                });
                Err(e)
            }
        }
    }

    /// Asks the server to cancel the tracked job.
    ///
    /// On success the handle is cleared right away; the running loop then
    /// fetches the job once more and ends with `PollOutcome::Dismissed`. On
    /// failure nothing changes and polling continues.
    pub async fn cancel(&self) -> Result<Ack, ApiError> {
        let Some(job_id) = self.job_id() else {
            return Err(ApiError::Validation(
                "No check-all job is running".to_string(),
            ));
        };

        let ack = self.api.cancel_check_all(&job_id).await?;
        info!("Cancellation requested for check-all job {}", job_id);
        self.cancel_requested.store(true, Ordering::SeqCst);
        self.clear_handle_if(&job_id);
        self.publish(|s| s.phase = PollerPhase::Cancelled);
        Ok(ack)
    }

    /// Stops tracking the job without telling the server.
    pub fn dismiss(&self) {
        if let Some(job_id) = self.job_id() {
            debug!("Dismissed check-all job {}", job_id);
        }
        self.set_handle(None);
        self.publish(|s| s.phase = PollerPhase::NoJob);
    }

    /// Polls the tracked job until it ends or `cancel` fires.
    pub async fn run(&self, cancel: &CancellationToken) -> PollOutcome {
        let Some(mut job_id) = self.job_id() else {
            return PollOutcome::Idle;
        };

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Stopped polling check-all job {}", job_id);
                    return PollOutcome::Stopped;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            match self.job_id() {
                None => return self.finish_dismissed(&job_id).await,
                Some(current) if current != job_id => {
                    debug!("Switching to check-all job {}", current);
                    job_id = current;
                }
                Some(_) => {}
            }

            match self.api.check_all_status(&job_id).await {
                Ok(job) => {
                    let job = self.publish_snapshot(job);
                    debug!(
                        "Check-all job {}: {} {:.0}% ({}/{})",
                        job.job_id, job.status, job.progress, job.checked, job.total
                    );
                    if job.status.is_terminal() {
                        self.clear_handle_if(&job_id);
                        self.invalidate_caches();
                        self.publish(|s| s.phase = PollerPhase::for_status(job.status));
                        info!("Check-all job {} {}", job.job_id, job.status);
                        return PollOutcome::Finished(job);
                    }
                }
                Err(e) if e.is_not_found() => {
                    warn!("Check-all job {} no longer exists on the server", job_id);
                    self.clear_handle_if(&job_id);
                    self.invalidate_caches();
                    self.publish(|s| s.phase = PollerPhase::NoJob);
                    return PollOutcome::Vanished;
                }
                Err(e) if e.kind() == ErrorKind::Authentication => {
                    warn!("Stopped polling check-all job {}: {}", job_id, e);
                    self.clear_handle_if(&job_id);
                    self.publish(|s| {
                        s.phase = PollerPhase::Failed;
                        s.last_error = Some(e.user_message());
                    });
                    return PollOutcome::Unauthorized;
                }
                Err(e) => {
                    warn!("Polling check-all job {} failed: {}", job_id, e);
                    self.publish(|s| s.last_error = Some(e.user_message()));
                }
            }
        }
    }

    /// One confirming fetch after the handle was cleared.
    async fn finish_dismissed(&self, job_id: &str) -> PollOutcome {
        let last = match self.api.check_all_status(job_id).await {
            Ok(job) => Some(self.publish_snapshot(job)),
            Err(e) => {
                debug!("Confirming fetch for job {} failed: {}", job_id, e);
                self.state().job
            }
        };
        self.invalidate_caches();

        let cancelled = self.cancel_requested.swap(false, Ordering::SeqCst);
        let phase = match &last {
            Some(job) if job.status.is_terminal() => PollerPhase::for_status(job.status),
            _ if cancelled => PollerPhase::Cancelled,
            _ => PollerPhase::NoJob,
        };
        self.publish(|s| s.phase = phase);
        PollOutcome::Dismissed(last)
    }
}
