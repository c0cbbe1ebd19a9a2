//! Import run state.

use std::time::Duration;

use serde::Serialize;

use crate::config::{Config, IMPORT_BATCH_DELAY_MS, IMPORT_BATCH_SIZE};

/// Lifecycle of one import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportPhase {
    #[default]
    Idle,
    Submitting,
    Importing,
    Completed,
    Cancelled,
}

impl ImportPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportPhase::Completed | ImportPhase::Cancelled)
    }
}

/// A batch whose request failed; every address in it counts as an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    /// Offset of the batch's first record in the candidate list.
    pub offset: usize,
    pub size: usize,
    pub kind: &'static str,
    pub message: String,
}

/// Progress of an import, published after every batch.
///
/// Counters only grow, and only when a batch finishes:
/// `added + skipped + errors <= current_offset <= total`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportRun {
    pub phase: ImportPhase,
    pub total: usize,
    pub added: usize,
    pub skipped: usize,
    pub errors: usize,
    pub current_offset: usize,
    pub cancelled: bool,
    pub failures: Vec<BatchFailure>,
}

impl ImportRun {
    pub(crate) fn started(total: usize) -> Self {
        Self {
            phase: ImportPhase::Submitting,
            total,
            ..Self::default()
        }
    }

    /// Percent of candidates processed, 0-100.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.current_offset as f64 / self.total as f64) * 100.0
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.current_offset)
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }
}

/// Batch size and pacing for the importer.
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    pub batch_size: usize,
    pub batch_delay: Duration,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            batch_size: IMPORT_BATCH_SIZE,
            batch_delay: Duration::from_millis(IMPORT_BATCH_DELAY_MS),
        }
    }
}

impl ImportOptions {
    /// A batch size of zero is raised to one.
    pub fn new(batch_size: usize, batch_delay: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            batch_delay,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.import_batch_size, config.import_batch_delay())
    }
}
