//! HTTP client wrapper.
//!
//! Every backend call goes through `ApiClient::request`, which:
//! - attaches the session's API key as the `X-API-Key` header
//! - unwraps the `{ "data": ... }` response envelope
//! - classifies failures into `ApiError` (see `error_handling`), clearing the
//!   session on 401 before the error is returned to the caller

use std::sync::Arc;

use log::{debug, error, warn};
use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use super::query::QueryPairs;
use crate::config::API_KEY_HEADER;
use crate::error_handling::{status_error, transport_error, ApiError, ErrorKind, InitializationError};
use crate::session::Session;

/// Typed client for the IP Blacklist Monitor API.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<Session>,
}

impl ApiClient {
    /// Creates a client rooted at `base_url` (e.g. `https://host/api/v1`).
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::InvalidBaseUrlError` if `base_url` is not
    /// an absolute http(s) URL.
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        session: Arc<Session>,
    ) -> Result<Self, InitializationError> {
        let invalid = |reason: &str| InitializationError::InvalidBaseUrlError {
            url: base_url.to_string(),
            reason: reason.to_string(),
        };
        let parsed = Url::parse(base_url.trim()).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if parsed.cannot_be_a_base() {
            return Err(invalid("URL cannot be used as a base"));
        }
        Ok(Self {
            http,
            base_url: parsed,
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the URL for `segments` below the base path.
    ///
    /// Each segment is percent-encoded, so addresses can be passed verbatim.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Sends one request and decodes the unwrapped response body into `T`.
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        query: Option<&QueryPairs>,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments);
        debug!("{} {}", method, url.path());

        let mut builder = self.http.request(method, url);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            builder = builder.query(query.as_slice());
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        if let Some(key) = self.session.api_key() {
            builder = builder.header(API_KEY_HEADER, key);
        }

        let response = builder.send().await.map_err(|e| {
            let err = transport_error(e);
            self.on_failure(&err);
            err
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            let err = transport_error(e);
            self.on_failure(&err);
            err
        })?;

        if !status.is_success() {
            let err = status_error(status.as_u16(), &text);
            self.on_failure(&err);
            return Err(err);
        }

        let value = unwrap_envelope(parse_body(&text)?);
        Ok(serde_json::from_value(value)?)
    }

    /// Side effects shared by every failed call.
    fn on_failure(&self, err: &ApiError) {
        match err.kind() {
            ErrorKind::Authentication => self.session.expire(),
            ErrorKind::RateLimited => {
                warn!("Rate limit exceeded. Please wait before making more requests.")
            }
            ErrorKind::Server => error!(
                "Server error ({}): {}",
                err.status().unwrap_or_default(),
                err.detail().unwrap_or("no detail")
            ),
            ErrorKind::Timeout => {
                error!("Request timeout - the server took too long to respond")
            }
            ErrorKind::Network => error!("Network error: {:?}", err),
            _ => debug!("Request failed: {}", err),
        }
    }
}

/// Parses a response body; an empty body is JSON `null`.
fn parse_body(text: &str) -> Result<serde_json::Value, ApiError> {
    if text.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    Ok(serde_json::from_str(text)?)
}

/// Replaces `{ "data": X, ... }` with `X`; any other value passes through.
pub fn unwrap_envelope(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(serde_json::Value::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(base: &str) -> Result<ApiClient, InitializationError> {
        ApiClient::new(
            reqwest::Client::new(),
            base,
            Arc::new(Session::anonymous()),
        )
    }

    #[test]
    fn test_unwrap_envelope() {
        assert_eq!(unwrap_envelope(json!({"data": {"a": 1}})), json!({"a": 1}));
        assert_eq!(
            unwrap_envelope(json!({"data": [1, 2], "meta": {}})),
            json!([1, 2])
        );
        assert_eq!(unwrap_envelope(json!({"data": null})), json!(null));
        assert_eq!(unwrap_envelope(json!({"a": 1})), json!({"a": 1}));
        assert_eq!(unwrap_envelope(json!([1])), json!([1]));
    }

    #[test]
    fn test_parse_body_empty_is_null() {
        assert_eq!(parse_body("").unwrap(), serde_json::Value::Null);
        assert_eq!(parse_body("  \n").unwrap(), serde_json::Value::Null);
        assert!(parse_body("{oops").is_err());
    }

    #[test]
    fn test_new_rejects_bad_base_urls() {
        assert!(client("not a url").is_err());
        assert!(client("ftp://host/api/v1").is_err());
        assert!(client("mailto:ops@example.com").is_err());
        assert!(client("https://blacklistapi.example.com/api/v1").is_ok());
    }

    #[test]
    fn test_endpoint_joins_and_encodes_segments() {
        let api = client("https://host.example/api/v1").unwrap();
        assert_eq!(
            api.endpoint(&["ips", "check-all", "current"]).as_str(),
            "https://host.example/api/v1/ips/check-all/current"
        );
        assert_eq!(
            api.endpoint(&["ips", "10.0.0.1/24", "history"]).as_str(),
            "https://host.example/api/v1/ips/10.0.0.1%2F24/history"
        );

        // A trailing slash on the base does not produce an empty segment
        let api = client("https://host.example/api/v1/").unwrap();
        assert_eq!(
            api.endpoint(&["stats"]).as_str(),
            "https://host.example/api/v1/stats"
        );
    }
}
