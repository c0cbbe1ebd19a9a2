//! Resource initialization.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::cache::QueryCache;
use crate::config::Config;
use crate::initialization::{init_api_client, init_session};

use super::resources::ClientResources;

/// Initialize all resources needed for a command.
///
/// 1. Build the session (explicit key in memory, else the credential file)
/// 2. Build the HTTP client and `ApiClient`
/// 3. Create an empty query cache
///
/// `cancel` becomes the invocation-wide token workflows observe.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the base URL is
/// invalid.
pub fn init_resources(
    config: Config,
    api_key: Option<&str>,
    cancel: CancellationToken,
) -> Result<ClientResources> {
    let session = init_session(&config, api_key);
    let api = init_api_client(&config, session.clone())
        .context("Failed to initialize API client")?;
    debug!("Using API at {}", api.base_url());

    Ok(ClientResources {
        config,
        session,
        api,
        cache: Arc::new(QueryCache::new()),
        cancel,
        start_time: Instant::now(),
    })
}
