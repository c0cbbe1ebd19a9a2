//! JSON status handler.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::super::types::{ErrorCounts, ImportStatus, KindCount, StatusResponse, StatusState};

/// Builds the `/status` payload from the latest published snapshots.
pub(crate) fn build_status(state: &StatusState) -> StatusResponse {
    let elapsed = state.start_time.elapsed().as_secs_f64();

    let import = state.import.as_ref().map(|rx| {
        let run = rx.borrow().clone();
        let rate = if elapsed > 0.0 {
            run.current_offset as f64 / elapsed
        } else {
            0.0
        };
        ImportStatus {
            percentage_complete: run.percent(),
            remaining: run.remaining(),
            rate_per_second: rate,
            run,
        }
    });

    let check_all = state.check_all.as_ref().map(|rx| rx.borrow().clone());

    let errors = match &state.error_stats {
        Some(stats) => ErrorCounts {
            total: stats.total(),
            by_kind: stats
                .snapshot()
                .into_iter()
                .map(|(kind, count)| KindCount {
                    kind: kind.as_str(),
                    count,
                })
                .collect(),
        },
        None => ErrorCounts {
            total: 0,
            by_kind: Vec::new(),
        },
    };

    StatusResponse {
        elapsed_seconds: elapsed,
        import,
        check_all,
        errors,
    }
}

/// JSON status endpoint with the current import run and check-all job
pub async fn status_handler(State(state): State<StatusState>) -> Response {
    let response = build_status(&state);

    let json = match serde_json::to_string_pretty(&response) {
        Ok(json) => json,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialize status: {}", e),
            )
                .into_response();
        }
    };

    (StatusCode::OK, [("content-type", "application/json")], json).into_response()
}
