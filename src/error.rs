//! Remote Error Types
//!
//! This module defines the error taxonomy for the data-access layer and the
//! retryable-error classifier used by the query executor.
//!
//! # Error Categories
//!
//! - `Transient` - network drops, timeouts, throttling, 503/504 - worth retrying
//! - `Permanent` - validation, auth, not-found, conflict - retrying cannot help
//! - `Configuration` - missing endpoint/credentials at startup
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be safely shared across task
//! boundaries.

use thiserror::Error;

/// Errors produced by remote operations and the executor
#[derive(Debug, Error, Clone)]
pub enum RemoteError {
    /// Transient failure: network, timeout, 503/504, throttling
    #[error("Transient remote error: {message}")]
    Transient {
        /// Human-readable error message
        message: String,
    },

    /// Permanent failure: validation, auth, not-found, conflict
    #[error("Permanent remote error: {message}")]
    Permanent {
        /// Human-readable error message
        message: String,
    },

    /// Missing or invalid remote endpoint/credentials
    #[error("Configuration error: {message}")]
    Configuration {
        /// Human-readable error message
        message: String,
    },
}

impl RemoteError {
    /// Create a new transient error
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    /// Create a new permanent error
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Permanent {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the executor should retry after this error.
    ///
    /// Transient errors are worth another attempt; permanent and
    /// configuration errors are not - the outcome would not change.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// The underlying message, regardless of category
    pub fn message(&self) -> &str {
        match self {
            Self::Transient { message }
            | Self::Permanent { message }
            | Self::Configuration { message } => message,
        }
    }
}

/// Substrings that mark an error message as transient.
///
/// Fixed heuristic covering connection drops, timeouts, DNS/socket errno
/// strings, gateway 503/504 responses, and the Postgres "cannot accept
/// connections right now" family (53300 too_many_connections, 57P03
/// cannot_connect_now). Anything not matched here is treated as permanent.
const TRANSIENT_MARKERS: &[&str] = &[
    "connection refused",
    "connection reset",
    "connection closed",
    "broken pipe",
    "timeout",
    "timed out",
    "network unreachable",
    "network error",
    "dns error",
    "econnrefused",
    "econnreset",
    "enotfound",
    "eai_again",
    "eagain",
    "503",
    "service unavailable",
    "504",
    "gateway timeout",
    "too many connections",
    "53300",
    "57p03",
    "resource temporarily unavailable",
];

/// Classify a raw error message as retryable or not.
///
/// Pure function, called fresh on each failure. Matching is
/// case-insensitive substring search against a fixed marker list.
pub fn is_retryable_message(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    TRANSIENT_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

/// Build a `RemoteError` from a raw message by classifying it
pub fn classify(message: impl Into<String>) -> RemoteError {
    let message = message.into();
    if is_retryable_message(&message) {
        RemoteError::Transient { message }
    } else {
        RemoteError::Permanent { message }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            return Self::transient(format!("Network error: {}", err));
        }
        if err.is_decode() {
            return Self::permanent(format!("Response decode error: {}", err));
        }
        classify(format!("Request error: {}", err))
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        Self::permanent(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_retryable() {
        assert!(is_retryable_message("request timed out after 30s"));
        assert!(is_retryable_message("Connection refused (os error 111)"));
        assert!(is_retryable_message("HTTP 503 Service Unavailable"));
        assert!(is_retryable_message("HTTP 504 Gateway Timeout"));
        assert!(is_retryable_message("getaddrinfo EAI_AGAIN db.example.co"));
        assert!(is_retryable_message("FATAL: 53300: too many connections"));
        assert!(is_retryable_message("resource temporarily unavailable"));
    }

    #[test]
    fn test_validation_is_not_retryable() {
        assert!(!is_retryable_message("null value in column \"name\""));
        assert!(!is_retryable_message("JWT expired"));
        assert!(!is_retryable_message("permission denied for table meals"));
        assert!(!is_retryable_message("duplicate key value violates unique constraint"));
    }

    #[test]
    fn test_classify_builds_matching_variant() {
        match classify("connection reset by peer") {
            RemoteError::Transient { message } => {
                assert_eq!(message, "connection reset by peer");
            }
            other => panic!("Expected Transient, got {:?}", other),
        }
        match classify("invalid input syntax for type uuid") {
            RemoteError::Permanent { .. } => {}
            other => panic!("Expected Permanent, got {:?}", other),
        }
    }

    #[test]
    fn test_is_retryable_per_variant() {
        assert!(RemoteError::transient("x").is_retryable());
        assert!(!RemoteError::permanent("x").is_retryable());
        assert!(!RemoteError::configuration("x").is_retryable());
    }

    #[test]
    fn test_error_display() {
        let error = RemoteError::transient("socket closed");
        let display = format!("{}", error);
        assert!(display.contains("Transient remote error"));
        assert!(display.contains("socket closed"));
    }

    #[test]
    fn test_from_serde_error() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let err: RemoteError = result.unwrap_err().into();
        assert!(!err.is_retryable());
    }
}
