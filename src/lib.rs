//! blacklist_monitor library: client for the IP Blacklist Monitor API
//!
//! This library wraps the backend's REST API (`/api/v1`) in a typed client and
//! implements the two long-running client workflows on top of it:
//! - **Bulk import**: parse free text into addresses and submit them in
//!   sequential, cancellable batches (`BulkImporter`)
//! - **Check-all jobs**: start, resume, poll and cancel the server-side job
//!   that re-checks every monitored address (`CheckAllPoller`)
//!
//! Progress of both workflows is published on `tokio::sync::watch` channels,
//! so the CLI progress log and the optional status server read the same
//! snapshots.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use blacklist_monitor::{
//!     init_api_client, BulkImporter, Config, ImportOptions, QueryCache, Session,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let session = Arc::new(Session::with_key("sk_live_123"));
//! let api = init_api_client(&config, session)?;
//! let importer = BulkImporter::new(api, Arc::new(QueryCache::new()), ImportOptions::default());
//!
//! let tags: [&str; 0] = [];
//! let run = importer
//!     .import_text("192.168.1.1,mail\n10.0.0.1", &tags, &CancellationToken::new())
//!     .await?;
//! println!("{} added, {} skipped, {} errors", run.added, run.skipped, run.errors);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod api;
mod app;
pub mod cache;
pub mod config;
pub mod error_handling;
pub mod export;
pub mod import;
pub mod initialization;
pub mod job;
pub mod parse;
mod run;
pub mod session;
pub mod status_server;

// Re-export public API
pub use api::{ApiClient, CheckJob, JobStatus};
pub use app::spawn_ctrl_c_handler;
pub use cache::{CacheKey, CachedApi, QueryCache};
pub use config::{Cli, Config, LogFormat, LogLevel};
pub use error_handling::{ApiError, ErrorKind, ErrorStats};
pub use import::{BulkImporter, ImportOptions, ImportPhase, ImportRun};
pub use initialization::{init_api_client, init_logger_with, init_session};
pub use job::{CheckAllPoller, PollOutcome, PollerPhase, PollerState};
pub use parse::{parse_candidates, CandidateRecord};
pub use run::{
    init_resources, run_check_all, run_cli, run_import, CheckAllMode, CheckAllReport,
    ClientResources, ImportReport,
};
pub use session::{CredentialStore, FileCredentialStore, MemoryCredentialStore, Session};
