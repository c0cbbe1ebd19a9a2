//! Bulk import orchestration.
//!
//! `BulkImporter` submits a parsed address list to `POST /ips/bulk` in fixed
//! size batches, strictly one at a time:
//! - a failed batch counts all its addresses as errors and the run continues
//! - a short delay separates batches (none after the last one)
//! - cancellation is observed before each batch and during the delay; a batch
//!   already in flight always completes
//! - when the run ends (completed or cancelled) the address list, stats and
//!   activity caches are invalidated once
//!
//! Progress is published on a `watch` channel after every batch so the CLI
//! progress line and the status server observe the same run.

mod types;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiClient, BulkAddRequest, BulkIpEntry};
use crate::cache::{CacheKey, QueryCache};
use crate::error_handling::{ApiError, ErrorStats};
use crate::parse::{parse_candidates, validate_tags, CandidateRecord};

pub use types::{BatchFailure, ImportOptions, ImportPhase, ImportRun};

/// Error message for an input with nothing importable.
pub const NO_VALID_ADDRESSES: &str = "No valid IP addresses found";

/// Runs bulk imports and publishes their progress.
pub struct BulkImporter {
    api: Arc<ApiClient>,
    cache: Arc<QueryCache>,
    options: ImportOptions,
    progress: watch::Sender<ImportRun>,
    error_stats: Arc<ErrorStats>,
    running: AtomicBool,
}

/// Clears the running flag however the import exits.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl BulkImporter {
    pub fn new(api: Arc<ApiClient>, cache: Arc<QueryCache>, options: ImportOptions) -> Self {
        let (progress, _) = watch::channel(ImportRun::default());
        Self {
            api,
            cache,
            options,
            progress,
            error_stats: Arc::new(ErrorStats::new()),
            running: AtomicBool::new(false),
        }
    }

    /// A receiver that sees every published `ImportRun`.
    pub fn subscribe(&self) -> watch::Receiver<ImportRun> {
        self.progress.subscribe()
    }

    /// The most recently published state.
    pub fn snapshot(&self) -> ImportRun {
        self.progress.borrow().clone()
    }

    /// Failure counts by kind, accumulated over every run of this importer.
    pub fn error_stats(&self) -> &Arc<ErrorStats> {
        &self.error_stats
    }

    pub fn options(&self) -> ImportOptions {
        self.options
    }

    /// Parses `text` and imports the valid, unique addresses found in it.
    pub async fn import_text<S: AsRef<str>>(
        &self,
        text: &str,
        tags: &[S],
        cancel: &CancellationToken,
    ) -> Result<ImportRun, ApiError> {
        let candidates = parse_candidates(text);
        debug!("Parsed {} candidate addresses", candidates.len());
        self.import(&candidates, tags, cancel).await
    }

    /// Imports `candidates` in batches, applying `tags` to every address.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` without contacting the backend when
    /// `candidates` is empty, the tag set is invalid, or another import on this
    /// importer is still running. Batch failures are not errors; they are
    /// counted in the returned `ImportRun`.
    pub async fn import<S: AsRef<str>>(
        &self,
        candidates: &[CandidateRecord],
        tags: &[S],
        cancel: &CancellationToken,
    ) -> Result<ImportRun, ApiError> {
        if candidates.is_empty() {
            return Err(ApiError::Validation(NO_VALID_ADDRESSES.to_string()));
        }
        let tags = validate_tags(tags)?;
        let tags = (!tags.is_empty()).then_some(tags);

        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ApiError::Validation(
                "An import is already in progress".to_string(),
            ));
        }
        let _running = RunningGuard(&self.running);

        let total = candidates.len();
        let batch_size = self.options.batch_size.max(1);
        let batch_count = total.div_ceil(batch_size);
        info!(
            "Importing {} addresses in {} batch(es) of up to {}",
            total, batch_count, batch_size
        );

        let mut run = ImportRun::started(total);
        self.progress.send_replace(run.clone());
        run.phase = ImportPhase::Importing;
        self.progress.send_replace(run.clone());

        for (index, batch) in candidates.chunks(batch_size).enumerate() {
            if cancel.is_cancelled() {
                run.cancelled = true;
                break;
            }

            let request = BulkAddRequest {
                ips: batch.iter().map(BulkIpEntry::from).collect(),
                tags: tags.clone(),
            };

            match self.api.add_bulk(&request).await {
                Ok(resp) => {
                    debug!(
                        "Batch {}/{}: {} added, {} skipped",
                        index + 1,
                        batch_count,
                        resp.added,
                        resp.skipped
                    );
                    // Counts can never exceed what this batch submitted.
                    let added = resp.added.min(batch.len());
                    let skipped = resp.skipped.min(batch.len() - added);
                    if added + skipped < resp.added + resp.skipped {
                        warn!(
                            "Batch {}/{} reported {} results for {} addresses",
                            index + 1,
                            batch_count,
                            resp.added + resp.skipped,
                            batch.len()
                        );
                    }
                    run.added += added;
                    run.skipped += skipped;
                }
                Err(e) => {
                    warn!(
                        "Batch {}/{} ({} addresses) failed: {}",
                        index + 1,
                        batch_count,
                        batch.len(),
                        e
                    );
                    self.error_stats.add(e.kind(), batch.len());
                    run.errors += batch.len();
                    run.failures.push(BatchFailure {
                        offset: run.current_offset,
                        size: batch.len(),
                        kind: e.kind().as_str(),
                        message: e.user_message(),
                    });
                }
            }

            run.current_offset += batch.len();
            self.progress.send_replace(run.clone());

            if index + 1 < batch_count {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        run.cancelled = true;
                        break;
                    }
                    _ = tokio::time::sleep(self.options.batch_delay) => {}
                }
            }
        }

        run.phase = if run.cancelled {
            ImportPhase::Cancelled
        } else {
            ImportPhase::Completed
        };
        self.cache.invalidate_many(&CacheKey::LIST_FAMILIES);
        self.progress.send_replace(run.clone());

        info!(
            "Import {}: {} added, {} skipped, {} errors ({}/{} processed)",
            if run.cancelled { "cancelled" } else { "completed" },
            run.added,
            run.skipped,
            run.errors,
            run.current_offset,
            run.total
        );
        Ok(run)
    }
}
