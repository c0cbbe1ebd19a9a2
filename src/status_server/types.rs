//! Status server data structures.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

use crate::error_handling::ErrorStats;
use crate::import::ImportRun;
use crate::job::PollerState;

/// Shared state for the status server
///
/// Holds receivers of the same `watch` channels the CLI progress line reads,
/// so the server never triggers requests of its own.
#[derive(Clone)]
pub struct StatusState {
    pub start_time: Arc<Instant>,
    pub import: Option<watch::Receiver<ImportRun>>,
    pub check_all: Option<watch::Receiver<PollerState>>,
    pub error_stats: Option<Arc<ErrorStats>>,
}

impl StatusState {
    pub fn new() -> Self {
        Self {
            start_time: Arc::new(Instant::now()),
            import: None,
            check_all: None,
            error_stats: None,
        }
    }

    pub fn with_import(
        mut self,
        progress: watch::Receiver<ImportRun>,
        error_stats: Arc<ErrorStats>,
    ) -> Self {
        self.import = Some(progress);
        self.error_stats = Some(error_stats);
        self
    }

    pub fn with_check_all(mut self, state: watch::Receiver<PollerState>) -> Self {
        self.check_all = Some(state);
        self
    }
}

impl Default for StatusState {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON response for `/status` endpoint
#[derive(Serialize)]
pub struct StatusResponse {
    pub elapsed_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<ImportStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_all: Option<PollerState>,
    pub errors: ErrorCounts,
}

#[derive(Serialize)]
pub struct ImportStatus {
    #[serde(flatten)]
    pub run: ImportRun,
    pub percentage_complete: f64,
    pub remaining: usize,
    pub rate_per_second: f64,
}

#[derive(Serialize)]
pub struct ErrorCounts {
    pub total: usize,
    pub by_kind: Vec<KindCount>,
}

#[derive(Serialize)]
pub struct KindCount {
    pub kind: &'static str,
    pub count: usize,
}
