//! Prometheus metrics handler.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::status::build_status;
use super::super::types::StatusState;
use crate::job::PollerPhase;

/// Prometheus-compatible metrics endpoint
pub async fn metrics_handler(State(state): State<StatusState>) -> Response {
    let status = build_status(&state);

    let (total, processed, added, skipped, errors, percent) = match &status.import {
        Some(i) => (
            i.run.total,
            i.run.current_offset,
            i.run.added,
            i.run.skipped,
            i.run.errors,
            i.percentage_complete,
        ),
        None => (0, 0, 0, 0, 0, 0.0),
    };

    let (job_active, job_progress, job_checked, job_total) = match &status.check_all {
        Some(s) => {
            let job = s.job.as_ref();
            (
                u8::from(s.phase == PollerPhase::Polling),
                job.map_or(0.0, |j| j.progress),
                job.map_or(0, |j| j.checked),
                job.map_or(0, |j| j.total),
            )
        }
        None => (0, 0.0, 0, 0),
    };

    let metrics = format!(
        r#"# HELP blacklist_monitor_import_total Addresses in the current import
# TYPE blacklist_monitor_import_total gauge
blacklist_monitor_import_total {}

# HELP blacklist_monitor_import_processed Addresses submitted so far
# TYPE blacklist_monitor_import_processed gauge
blacklist_monitor_import_processed {}

# HELP blacklist_monitor_import_added Addresses the backend added
# TYPE blacklist_monitor_import_added gauge
blacklist_monitor_import_added {}

# HELP blacklist_monitor_import_skipped Addresses the backend skipped as duplicates
# TYPE blacklist_monitor_import_skipped gauge
blacklist_monitor_import_skipped {}

# HELP blacklist_monitor_import_errors Addresses in failed batches
# TYPE blacklist_monitor_import_errors gauge
blacklist_monitor_import_errors {}

# HELP blacklist_monitor_import_percentage_complete Percentage of the import processed (0-100)
# TYPE blacklist_monitor_import_percentage_complete gauge
blacklist_monitor_import_percentage_complete {}

# HELP blacklist_monitor_check_all_active Whether a check-all job is being polled
# TYPE blacklist_monitor_check_all_active gauge
blacklist_monitor_check_all_active {}

# HELP blacklist_monitor_check_all_progress Check-all job progress (0-100)
# TYPE blacklist_monitor_check_all_progress gauge
blacklist_monitor_check_all_progress {}

# HELP blacklist_monitor_check_all_checked Addresses checked by the job
# TYPE blacklist_monitor_check_all_checked gauge
blacklist_monitor_check_all_checked {}

# HELP blacklist_monitor_check_all_total Addresses the job will check
# TYPE blacklist_monitor_check_all_total gauge
blacklist_monitor_check_all_total {}

# HELP blacklist_monitor_errors_total Failed requests counted by kind
# TYPE blacklist_monitor_errors_total counter
blacklist_monitor_errors_total {}
"#,
        total,
        processed,
        added,
        skipped,
        errors,
        percent,
        job_active,
        job_progress,
        job_checked,
        job_total,
        status.errors.total
    );

    (StatusCode::OK, metrics).into_response()
}
