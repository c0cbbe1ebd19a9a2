//! Error type definitions.
//!
//! This module defines the error taxonomy used throughout the client: the
//! classification of failed backend calls (`ErrorKind`), the error value every
//! API call returns (`ApiError`), and initialization failures.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The configured API base URL could not be parsed.
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrlError { url: String, reason: String },
}

/// Classification of a failed backend call.
///
/// Every `ApiError` maps onto exactly one kind. The kind drives propagation
/// policy: `Authentication` clears the session, `NotFound` ends job polling,
/// and everything else is counted or surfaced by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorKind {
    Authentication, // 401
    Authorization,  // 403
    NotFound,       // 404
    RateLimited,    // 429
    Server,         // 5xx
    Timeout,
    Network,
    Validation,
    Other,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Authentication => "Authentication failed (401)",
            ErrorKind::Authorization => "Forbidden (403)",
            ErrorKind::NotFound => "Not Found (404)",
            ErrorKind::RateLimited => "Too many requests (429)",
            ErrorKind::Server => "Server error (5xx)",
            ErrorKind::Timeout => "Request timeout",
            ErrorKind::Network => "Network unreachable",
            ErrorKind::Validation => "Validation error",
            ErrorKind::Other => "Other error",
        }
    }

    /// Stable user-facing message for this kind.
    ///
    /// `Other` and `Validation` have no fixed text; their message comes from
    /// the backend body or the failed check.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            ErrorKind::Authentication => Some("Authentication failed. Please log in again."),
            ErrorKind::Authorization => {
                Some("You do not have permission to perform this action.")
            }
            ErrorKind::NotFound => Some("The requested resource was not found."),
            ErrorKind::RateLimited => {
                Some("Too many requests. Please wait a moment and try again.")
            }
            ErrorKind::Server => Some("Server error. Please try again later."),
            ErrorKind::Timeout => {
                Some("Request timed out. Please check your connection and try again.")
            }
            ErrorKind::Network => Some("Network error. Please check your internet connection."),
            ErrorKind::Validation | ErrorKind::Other => None,
        }
    }
}

/// Error returned by every backend call and by client-side validation.
///
/// `Display` renders the user-facing message. The underlying transport error
/// (if any) stays reachable through `source()`, and the backend's own
/// `detail`/`error` text is kept in `detail`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("{message}")]
    Status {
        kind: ErrorKind,
        status: u16,
        message: String,
        detail: Option<String>,
    },

    /// The request never produced a response (timeout, connect failure, ...).
    #[error("{message}")]
    Transport {
        kind: ErrorKind,
        message: String,
        #[source]
        source: ReqwestError,
    },

    /// The response body did not match the expected schema.
    #[error("Unexpected response from server: {0}")]
    Decode(#[from] serde_json::Error),

    /// A client-side check failed before any request was made.
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Status { kind, .. } | ApiError::Transport { kind, .. } => *kind,
            ApiError::Decode(_) => ErrorKind::Other,
            ApiError::Validation(_) => ErrorKind::Validation,
        }
    }

    /// The message to show the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// HTTP status code, when the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Backend-provided detail text, when the backend answered with one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_error_kind_as_str() {
        assert_eq!(ErrorKind::NotFound.as_str(), "Not Found (404)");
        assert_eq!(ErrorKind::Timeout.as_str(), "Request timeout");
        assert_eq!(ErrorKind::Server.to_string(), "Server error (5xx)");
    }

    #[test]
    fn test_all_error_kinds_have_string_representation() {
        for kind in ErrorKind::iter() {
            assert!(!kind.as_str().is_empty(), "{:?} should have non-empty string", kind);
        }
    }

    #[test]
    fn test_fixed_user_messages() {
        assert_eq!(
            ErrorKind::Authentication.user_message(),
            Some("Authentication failed. Please log in again.")
        );
        assert_eq!(
            ErrorKind::RateLimited.user_message(),
            Some("Too many requests. Please wait a moment and try again.")
        );
        assert_eq!(ErrorKind::Other.user_message(), None);
        assert_eq!(ErrorKind::Validation.user_message(), None);
    }

    #[test]
    fn test_status_error_display_is_user_message() {
        let err = ApiError::Status {
            kind: ErrorKind::Authorization,
            status: 403,
            message: ErrorKind::Authorization
                .user_message()
                .unwrap_or_default()
                .to_string(),
            detail: Some("key lacks scope".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "You do not have permission to perform this action."
        );
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.detail(), Some("key lacks scope"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_validation_error() {
        let err = ApiError::Validation("No valid IP addresses found".to_string());
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.user_message(), "No valid IP addresses found");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_decode_error_is_other() {
        let json_err = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
        let err = ApiError::from(json_err);
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(err.to_string().starts_with("Unexpected response from server"));
    }
}
