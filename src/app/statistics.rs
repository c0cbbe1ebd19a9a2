//! Final statistics printing.

use log::{info, warn};

use crate::api::{CheckJob, JobStatus};
use crate::error_handling::ErrorStats;
use crate::import::ImportRun;

/// Prints the outcome of an import run and its error breakdown.
pub fn print_import_statistics(run: &ImportRun, error_stats: &ErrorStats, elapsed_seconds: f64) {
    info!(
        "Import statistics: total={}, processed={}, added={}, skipped={}, errors={}",
        run.total, run.current_offset, run.added, run.skipped, run.errors
    );

    print_error_statistics(error_stats);

    for failure in &run.failures {
        warn!(
            "   Batch at offset {} ({} addresses): {}",
            failure.offset, failure.size, failure.message
        );
    }

    info!(
        "{} {} address{} ({} added, {} skipped, {} errors) in {:.1}s",
        if run.cancelled {
            "⏹️ Cancelled after"
        } else {
            "✅ Imported"
        },
        run.current_offset,
        if run.current_offset == 1 { "" } else { "es" },
        run.added,
        run.skipped,
        run.errors,
        elapsed_seconds
    );
}

/// Prints error counts per kind to the log.
pub fn print_error_statistics(error_stats: &ErrorStats) {
    let total_errors = error_stats.total();
    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for (kind, count) in error_stats.snapshot() {
            info!("   {}: {}", kind.as_str(), count);
        }
    }
}

/// Prints the final snapshot of a check-all job.
pub fn print_job_statistics(job: &CheckJob) {
    let headline = match job.status {
        JobStatus::Completed => "✅ Check-all job completed",
        JobStatus::Cancelled => "⏹️ Check-all job cancelled",
        JobStatus::Failed => "❌ Check-all job failed",
        JobStatus::Pending | JobStatus::Running => "Check-all job still running",
    };
    info!(
        "{} ({}): {}/{} checked, {} clean, {} blacklisted, {} errors{}",
        headline,
        job.job_id,
        job.checked,
        job.total,
        job.clean,
        job.blacklisted,
        job.errors,
        job.duration_seconds
            .map(|d| format!(" in {:.1}s", d))
            .unwrap_or_default()
    );
}
