//! Login, logout and session validation.

use log::{debug, info};
use thiserror::Error;

use crate::api::ApiClient;
use crate::error_handling::{ApiError, ErrorKind};

use super::store::StoreError;

/// Why a login attempt failed, phrased for the user.
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("API key is required")]
    MissingKey,

    #[error("Invalid API key")]
    InvalidKey,

    #[error("API key does not have required permissions")]
    InsufficientPermissions,

    #[error("Connection timeout. Please check if the API server is running.")]
    Timeout,

    #[error("Unable to connect to API server. Please check your network connection.")]
    Unreachable,

    #[error("Authentication failed. Please try again.")]
    Failed(#[source] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ApiError> for LoginError {
    fn from(err: ApiError) -> Self {
        match err.kind() {
            ErrorKind::Authentication => LoginError::InvalidKey,
            ErrorKind::Authorization => LoginError::InsufficientPermissions,
            ErrorKind::Timeout => LoginError::Timeout,
            ErrorKind::Network => LoginError::Unreachable,
            _ => LoginError::Failed(err),
        }
    }
}

/// Stores `api_key` and verifies it with a `/health` probe.
///
/// The key is trimmed first. On any failure the key is removed again, so an
/// invalid key never stays persisted.
pub async fn login(api: &ApiClient, api_key: &str) -> Result<(), LoginError> {
    let key = api_key.trim();
    if key.is_empty() {
        return Err(LoginError::MissingKey);
    }

    let session = api.session();
    session.store_key(key)?;

    match api.health().await {
        Ok(health) => {
            session.mark_authenticated();
            info!("Logged in (backend status: {})", health.status);
            Ok(())
        }
        Err(e) => {
            debug!("Login probe failed: {:?}", e);
            session.clear();
            Err(LoginError::from(e))
        }
    }
}

/// Forgets the stored key and the authenticated flag.
pub fn logout(api: &ApiClient) {
    api.session().clear();
    info!("Logged out");
}

/// Re-checks a stored key against the backend.
///
/// Returns `false` when there is no key, or when the backend rejects it
/// (401/403), in which case the session is cleared. Other failures (network
/// trouble, server errors) keep the session and return `true`.
pub async fn validate_session(api: &ApiClient) -> bool {
    let session = api.session();
    if !session.has_key() {
        session.clear();
        return false;
    }

    match api.health().await {
        Ok(_) => {
            session.mark_authenticated();
            true
        }
        Err(e) if matches!(e.kind(), ErrorKind::Authentication | ErrorKind::Authorization) => {
            session.clear();
            false
        }
        Err(e) => {
            debug!("Session validation inconclusive, keeping session: {}", e);
            true
        }
    }
}
