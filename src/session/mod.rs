//! Session state and authentication.
//!
//! A `Session` is constructed once at startup with an injected
//! `CredentialStore` and shared (via `Arc`) with the HTTP client. It holds:
//! - the durable credential (through the store)
//! - the in-process "authenticated" flag, set by a successful login or
//!   validation and cleared whenever the backend rejects the key

mod auth;
mod store;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::warn;

pub use auth::{login, logout, validate_session, LoginError};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore, StoreError};

/// Credential holder shared by the HTTP client and the CLI.
pub struct Session {
    store: Arc<dyn CredentialStore>,
    authenticated: AtomicBool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            authenticated: AtomicBool::new(false),
        }
    }

    /// Session over an in-memory store holding `key`.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self::new(Arc::new(MemoryCredentialStore::with_key(key)))
    }

    /// Session with no credential at all.
    pub fn anonymous() -> Self {
        Self::new(Arc::new(MemoryCredentialStore::new()))
    }

    /// The current API key, if one is stored.
    ///
    /// A store read failure is logged and treated as "no key"; the request then
    /// goes out unauthenticated and the backend's 401 drives re-login.
    pub fn api_key(&self) -> Option<String> {
        match self.store.load() {
            Ok(key) => key,
            Err(e) => {
                warn!("Failed to read stored API key: {}", e);
                None
            }
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key().is_some()
    }

    pub(crate) fn store_key(&self, key: &str) -> Result<(), StoreError> {
        self.store.save(key)
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_authenticated(&self) {
        self.authenticated.store(true, Ordering::SeqCst);
    }

    /// Forgets the credential and the authenticated flag.
    pub fn clear(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
        if let Err(e) = self.store.clear() {
            warn!("Failed to clear stored API key: {}", e);
        }
    }

    /// Called by the HTTP client when the backend answers 401.
    pub(crate) fn expire(&self) {
        warn!("API key rejected by the server; stored credential cleared. Please log in again.");
        self.clear();
    }
}
