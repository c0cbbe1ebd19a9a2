//! Error categorization.
//!
//! Maps HTTP status codes and transport failures onto `ErrorKind` and builds
//! the corresponding `ApiError` values.

use super::types::{ApiError, ErrorKind};

/// Fallback message for failures with no fixed text and no backend detail.
const GENERIC_FAILURE_MESSAGE: &str = "Request failed. Please try again.";

/// Categorizes a non-success HTTP status code into an `ErrorKind`.
pub fn categorize_status(status: u16) -> ErrorKind {
    match status {
        401 => ErrorKind::Authentication,
        403 => ErrorKind::Authorization,
        404 => ErrorKind::NotFound,
        crate::config::HTTP_STATUS_TOO_MANY_REQUESTS => ErrorKind::RateLimited,
        500..=599 => ErrorKind::Server,
        _ => ErrorKind::Other,
    }
}

/// Categorizes a `reqwest::Error` into an `ErrorKind`.
///
/// Errors carrying a status code are categorized by status first. Otherwise a
/// timeout is `Timeout`, and any failure that never got a response
/// (connect/request errors) is `Network`.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ErrorKind {
    if let Some(status) = error.status() {
        return categorize_status(status.as_u16());
    }

    if error.is_timeout() {
        ErrorKind::Timeout
    } else if error.is_connect() || error.is_request() {
        ErrorKind::Network
    } else {
        ErrorKind::Other
    }
}

/// Extracts the backend's explanation from an error body.
///
/// The backend reports failures as `{"detail": "..."}` or `{"error": "..."}`,
/// possibly wrapped in the `data` envelope. Non-JSON bodies yield `None`.
pub fn extract_error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let value = match value.get("data") {
        Some(inner) if inner.is_object() => inner.clone(),
        _ => value,
    };
    ["detail", "error", "message"]
        .iter()
        .find_map(|field| value.get(*field).and_then(|v| v.as_str()))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Builds the `ApiError` for a non-success response.
pub fn status_error(status: u16, body: &str) -> ApiError {
    let kind = categorize_status(status);
    let detail = extract_error_detail(body);
    let message = match kind.user_message() {
        Some(fixed) => fixed.to_string(),
        None => detail
            .clone()
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
    };
    ApiError::Status {
        kind,
        status,
        message,
        detail,
    }
}

/// Builds the `ApiError` for a request that failed without a usable response.
pub fn transport_error(error: reqwest::Error) -> ApiError {
    let kind = categorize_reqwest_error(&error);
    let message = kind
        .user_message()
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string());
    ApiError::Transport {
        kind,
        message,
        source: error,
    }
}
