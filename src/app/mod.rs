//! Main application modules.
//!
//! This module provides progress logging, shutdown handling and statistics
//! printing used by the workflow runners.

pub mod logging;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use logging::{log_import_progress, log_job_progress, spawn_progress_logger};
pub use shutdown::{shutdown_gracefully, spawn_ctrl_c_handler};
pub use statistics::{print_error_statistics, print_import_statistics, print_job_statistics};
