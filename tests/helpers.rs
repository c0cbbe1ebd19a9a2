// Shared test helpers for mock backends and client setup.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::sync::Arc;
use std::time::Duration;

use httptest::Server;

use blacklist_monitor::{ApiClient, QueryCache, Session};

/// API key used by every mock backend.
#[allow(dead_code)] // Used by other test files
pub const TEST_KEY: &str = "test-key";

/// Base URL of the mock backend, including the `/api/v1` prefix.
#[allow(dead_code)] // Used by other test files
pub fn base_url(server: &Server) -> String {
    format!("http://{}/api/v1", server.addr())
}

/// Creates a client for `server` that authenticates with `TEST_KEY`.
#[allow(dead_code)] // Used by other test files
pub fn test_client(server: &Server) -> Arc<ApiClient> {
    test_client_with(server, Arc::new(Session::with_key(TEST_KEY)), Duration::from_secs(5))
}

/// Creates a client for `server` with an explicit session and timeout.
#[allow(dead_code)] // Used by other test files
pub fn test_client_with(server: &Server, session: Arc<Session>, timeout: Duration) -> Arc<ApiClient> {
    let http = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to build HTTP client");
    Arc::new(ApiClient::new(http, &base_url(server), session).expect("Invalid mock base URL"))
}

/// Creates an empty query cache.
#[allow(dead_code)] // Used by other test files
pub fn test_cache() -> Arc<QueryCache> {
    Arc::new(QueryCache::new())
}

/// Builds `n` distinct IPv4 addresses, one per line.
#[allow(dead_code)] // Used by other test files
pub fn address_lines(n: usize) -> String {
    (0..n)
        .map(|i| format!("10.{}.{}.{}", i / 65536 % 256, i / 256 % 256, i % 256))
        .collect::<Vec<_>>()
        .join("\n")
}
