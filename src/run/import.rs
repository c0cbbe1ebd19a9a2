//! Bulk import workflow.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use log::warn;
use tokio_util::sync::CancellationToken;

use crate::app::{
    log_import_progress, print_import_statistics, shutdown_gracefully, spawn_progress_logger,
};
use crate::config::PROGRESS_LOG_INTERVAL;
use crate::import::{BulkImporter, ImportOptions, ImportRun};
use crate::status_server::{start_status_server, StatusState};

use super::resources::ClientResources;

/// Results of a bulk import.
#[derive(Debug, Clone)]
pub struct ImportReport {
    /// Final snapshot of the import run
    pub run: ImportRun,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

/// Imports every valid address in `text`, tagging each with `tags`.
///
/// Progress is logged periodically and, when a status port is configured,
/// served on `/status`. Cancelling `resources.cancel` stops the import before
/// its next batch; the report then has `run.cancelled` set.
///
/// # Errors
///
/// Returns an error if no valid address is found or the tags are invalid.
/// Failed batches are counted in the report, not returned as errors.
pub async fn run_import(
    resources: &ClientResources,
    text: &str,
    tags: &[String],
) -> Result<ImportReport> {
    let start_time = Instant::now();
    let importer = Arc::new(BulkImporter::new(
        resources.api.clone(),
        resources.cache.clone(),
        ImportOptions::from_config(&resources.config),
    ));

    let status_server = resources.config.status_port.map(|port| {
        let state = StatusState::new()
            .with_import(importer.subscribe(), importer.error_stats().clone());
        tokio::spawn(async move {
            if let Err(e) = start_status_server(port, state).await {
                warn!("Status server error: {}", e);
            }
        })
    });

    let logger_cancel = CancellationToken::new();
    let logging_task = spawn_progress_logger(
        importer.subscribe(),
        PROGRESS_LOG_INTERVAL,
        logger_cancel.clone(),
        move |run: &ImportRun| log_import_progress(run, start_time),
    );

    let result = importer
        .import_text(text, tags, &resources.cancel)
        .await;

    shutdown_gracefully(logger_cancel, Some(logging_task), status_server).await;

    let run = result?;
    let elapsed_seconds = start_time.elapsed().as_secs_f64();
    print_import_statistics(&run, importer.error_stats(), elapsed_seconds);

    Ok(ImportReport {
        run,
        elapsed_seconds,
    })
}
