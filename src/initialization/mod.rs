//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources:
//! - Logger
//! - Session (credential store)
//! - HTTP client and `ApiClient`
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;

use std::sync::Arc;

use crate::config::Config;
use crate::session::{FileCredentialStore, MemoryCredentialStore, Session};

// Re-export public API
pub use client::{init_api_client, init_client};
pub use logger::init_logger_with;

/// Initializes the session.
///
/// An explicit `api_key` (from `--api-key` or the environment) is held in
/// memory only and never written to disk. Without one, the credential file
/// at `config.credentials_path` is used, which is where `login` persists keys.
pub fn init_session(config: &Config, api_key: Option<&str>) -> Arc<Session> {
    match api_key.map(str::trim).filter(|k| !k.is_empty()) {
        Some(key) => Arc::new(Session::new(Arc::new(MemoryCredentialStore::with_key(key)))),
        None => Arc::new(Session::new(Arc::new(FileCredentialStore::new(
            config.credentials_path.clone(),
        )))),
    }
}
