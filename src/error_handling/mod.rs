//! Error handling.
//!
//! This module provides:
//! - The client error taxonomy (`ErrorKind`) and error value (`ApiError`)
//! - Categorization of HTTP statuses and transport failures
//! - Per-kind error counters used in import reports
//!
//! Propagation policy: authentication failures are handled once in the HTTP
//! wrapper (the session is cleared); every other kind is returned to the call
//! site, which decides whether to count, skip, or display it.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{
    categorize_reqwest_error, categorize_status, extract_error_detail, status_error,
    transport_error,
};
pub use stats::ErrorStats;
pub use types::{ApiError, ErrorKind, InitializationError};
