//! Transport-level error types.
//!
//! These errors describe failures of the underlying push channel: building a
//! connection, the HTTP handshake, and the long-lived event stream itself.
//! Every variant is cheap to clone so the same value can be handed to the
//! user's error callback and to diagnostics.

use thiserror::Error;

/// Errors reported by an event-stream transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The endpoint could not be parsed as a URL.
    #[error("Invalid endpoint URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// A configured request header is not a valid HTTP header.
    #[error("Invalid request header '{name}': {message}")]
    InvalidHeader { name: String, message: String },

    /// `connect` was called outside of a tokio runtime.
    #[error("No tokio runtime available to drive the connection")]
    NoRuntime,

    /// The HTTP request could not be sent.
    #[error("Connection to {url} failed: {message}")]
    ConnectionFailed { url: String, message: String },

    /// The HTTP request timed out.
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// The server answered with a non-success status.
    #[error("Server responded with HTTP {status}")]
    HttpStatus { status: u16 },

    /// The server answered with something other than an event stream.
    #[error("Expected a text/event-stream response, got '{content_type}'")]
    UnexpectedContentType { content_type: String },

    /// Reading or decoding the event stream failed.
    #[error("Event stream error: {message}")]
    Stream { message: String },

    /// The server ended the event stream.
    #[error("Server closed the event stream")]
    ServerClosed,
}

impl TransportError {
    /// Returns true when the error happened while building the connection,
    /// before any network activity.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            TransportError::InvalidUrl { .. }
                | TransportError::InvalidHeader { .. }
                | TransportError::NoRuntime
        )
    }

    /// Returns true if a fresh connection might succeed.
    ///
    /// Informational: the client's retry policy reconnects after every
    /// transport error regardless.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::HttpStatus { status } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            TransportError::UnexpectedContentType { .. } => false,
            other => !other.is_construction_error(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            TransportError::InvalidUrl { .. } => "E_SSE_URL",
            TransportError::InvalidHeader { .. } => "E_SSE_HEADER",
            TransportError::NoRuntime => "E_SSE_RUNTIME",
            TransportError::ConnectionFailed { .. } => "E_SSE_CONN",
            TransportError::Timeout { .. } => "E_SSE_TIMEOUT",
            TransportError::HttpStatus { .. } => "E_SSE_STATUS",
            TransportError::UnexpectedContentType { .. } => "E_SSE_CONTENT_TYPE",
            TransportError::Stream { .. } => "E_SSE_STREAM",
            TransportError::ServerClosed => "E_SSE_CLOSED",
        }
    }
}

/// Classify a reqwest error into a [`TransportError`].
pub fn classify_reqwest_error(err: &reqwest::Error, url: &str) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else if let Some(status) = err.status() {
        TransportError::HttpStatus {
            status: status.as_u16(),
        }
    } else if err.is_body() || err.is_decode() {
        TransportError::Stream {
            message: err.to_string(),
        }
    } else {
        TransportError::ConnectionFailed {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(TransportError::ServerClosed.is_retryable());
        assert!(TransportError::HttpStatus { status: 503 }.is_retryable());
        assert!(TransportError::HttpStatus { status: 429 }.is_retryable());
        assert!(!TransportError::HttpStatus { status: 404 }.is_retryable());
        assert!(!TransportError::NoRuntime.is_retryable());
        assert!(!TransportError::UnexpectedContentType {
            content_type: "text/html".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::HttpStatus { status: 503 };
        assert_eq!(err.to_string(), "Server responded with HTTP 503");

        let err = TransportError::UnexpectedContentType {
            content_type: "application/json".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Expected a text/event-stream response, got 'application/json'"
        );

        assert_eq!(
            TransportError::ServerClosed.to_string(),
            "Server closed the event stream"
        );
    }

    #[test]
    fn test_construction_errors() {
        assert!(TransportError::NoRuntime.is_construction_error());
        assert!(TransportError::InvalidUrl {
            url: "nope".to_string(),
            message: "relative URL without a base".to_string(),
        }
        .is_construction_error());
        assert!(!TransportError::ServerClosed.is_construction_error());
        assert!(!TransportError::HttpStatus { status: 500 }.is_construction_error());
    }

    #[test]
    fn test_error_codes_are_unique() {
        let errors = [
            TransportError::InvalidUrl {
                url: String::new(),
                message: String::new(),
            },
            TransportError::InvalidHeader {
                name: String::new(),
                message: String::new(),
            },
            TransportError::NoRuntime,
            TransportError::ConnectionFailed {
                url: String::new(),
                message: String::new(),
            },
            TransportError::Timeout { url: String::new() },
            TransportError::HttpStatus { status: 500 },
            TransportError::UnexpectedContentType {
                content_type: String::new(),
            },
            TransportError::Stream {
                message: String::new(),
            },
            TransportError::ServerClosed,
        ];

        let mut codes: Vec<&str> = errors.iter().map(|e| e.error_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_transport_error_implements_error_trait() {
        let err = TransportError::ServerClosed;
        let _: &dyn std::error::Error = &err;
    }
}
