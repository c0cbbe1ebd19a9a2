//! HTTP client initialization.
//!
//! This module builds the `reqwest::Client` and wraps it, together with the
//! session, into the `ApiClient` used by every command.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::api::ApiClient;
use crate::config::Config;
use crate::error_handling::InitializationError;
use crate::session::Session;

/// User-Agent sent with every request.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Initializes the HTTP client with default settings.
///
/// Creates a `reqwest::Client` configured with:
/// - the request timeout from `config` (30 s unless overridden)
/// - a connect timeout capped at the request timeout
/// - a crate-specific User-Agent
/// - Rustls TLS backend (no native TLS)
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    let timeout = config.timeout();
    ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .user_agent(USER_AGENT)
        .build()
}

/// Builds the shared `ApiClient` for `config.api_url`.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if the HTTP client cannot be
/// built, or `InvalidBaseUrlError` if the base URL is unusable.
pub fn init_api_client(
    config: &Config,
    session: Arc<Session>,
) -> Result<Arc<ApiClient>, InitializationError> {
    let http = init_client(config)?;
    Ok(Arc::new(ApiClient::new(http, &config.api_url, session)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_api_client_default_config() {
        let config = Config::default();
        let api = init_api_client(&config, Arc::new(Session::anonymous())).unwrap();
        assert_eq!(api.base_url().as_str(), config.api_url);
    }

    #[test]
    fn test_init_api_client_rejects_bad_url() {
        let config = Config {
            api_url: "::not a url::".to_string(),
            ..Config::default()
        };
        let err = init_api_client(&config, Arc::new(Session::anonymous())).unwrap_err();
        assert!(matches!(err, InitializationError::InvalidBaseUrlError { .. }));
    }
}
