//! Shared client resources.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::cache::{CachedApi, QueryCache};
use crate::config::Config;
use crate::session::Session;

/// Everything a command needs, built once per invocation.
pub struct ClientResources {
    /// Effective configuration
    pub config: Config,
    /// Session shared with the HTTP client
    pub session: Arc<Session>,
    /// Backend client
    pub api: Arc<ApiClient>,
    /// Query cache invalidated by workflows
    pub cache: Arc<QueryCache>,
    /// Cancelled on Ctrl-C; workflows observe it between requests
    pub cancel: CancellationToken,
    /// When the invocation started
    pub start_time: Instant,
}

impl ClientResources {
    /// Read-through view of the backend over the shared cache.
    pub fn cached(&self) -> CachedApi {
        CachedApi::new(self.api.clone(), self.cache.clone())
    }

    /// Seconds since the invocation started.
    pub fn elapsed_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}
