//! Poller state and outcomes.

use serde::Serialize;

use crate::api::{CheckJob, JobStatus};

/// Where the poller is in a job's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollerPhase {
    #[default]
    NoJob,
    Resuming,
    Starting,
    Polling,
    Completed,
    Cancelled,
    Failed,
}

impl PollerPhase {
    /// Phase shown for a job that reached `status`.
    pub fn for_status(status: JobStatus) -> Self {
        match status {
            JobStatus::Pending | JobStatus::Running => PollerPhase::Polling,
            JobStatus::Completed => PollerPhase::Completed,
            JobStatus::Cancelled => PollerPhase::Cancelled,
            JobStatus::Failed => PollerPhase::Failed,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self,
            PollerPhase::Resuming | PollerPhase::Starting | PollerPhase::Polling
        )
    }
}

/// Everything observers of the poller see.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PollerState {
    pub phase: PollerPhase,
    pub job_id: Option<String>,
    pub job: Option<CheckJob>,
    /// Last transient polling failure; cleared by the next good snapshot.
    pub last_error: Option<String>,
}

/// How a `run` loop ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The job reached a terminal status.
    Finished(CheckJob),
    /// The server no longer knows the job.
    Vanished,
    /// The handle was cleared by `cancel` or `dismiss`; carries the last
    /// known snapshot.
    Dismissed(Option<CheckJob>),
    /// The server rejected the API key; the session was expired and the job
    /// is no longer tracked.
    Unauthorized,
    /// The loop's cancellation token fired; the job keeps running server-side.
    Stopped,
    /// There was no job to poll.
    Idle,
}
