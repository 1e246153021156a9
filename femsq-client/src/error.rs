//! Error types for the FEMSQ API client

use std::time::Duration;
use thiserror::Error;

use crate::transport::Body;

/// Message shown when the request never reached the server.
pub const NETWORK_MESSAGE: &str = "Could not complete the request to the server";

/// Message shown when the request timer fired before a response arrived.
pub const TIMEOUT_MESSAGE: &str = "Timed out waiting for a response from the server";

/// API client error
///
/// The variant is decided once, at the transport boundary. Callers never
/// re-infer the kind of failure from the message.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Server answered with a non-2xx status
    #[error("{message}")]
    Http {
        message: String,
        status: u16,
        status_text: String,
        url: String,
        body: Option<Body>,
    },

    /// Request failed before any response was received
    #[error("{message}")]
    Network {
        message: String,
        url: String,
        detail: String,
    },

    /// Request was cancelled by its timer
    #[error("{message}")]
    Timeout {
        message: String,
        url: String,
        timeout: Duration,
    },

    /// Successful response whose body does not match the expected shape
    #[error("{message}")]
    Decode {
        message: String,
        status: u16,
        url: String,
    },
}

impl ApiError {
    /// Build an HTTP error, taking the message from a JSON `message` field
    /// when the server sent one.
    pub fn http(
        status: u16,
        status_text: impl Into<String>,
        url: impl Into<String>,
        body: Option<Body>,
    ) -> Self {
        let message = body
            .as_ref()
            .and_then(Body::json_message)
            .unwrap_or_else(|| generic_status_message(status));

        ApiError::Http {
            message,
            status,
            status_text: status_text.into(),
            url: url.into(),
            body,
        }
    }

    /// Build an HTTP error for a binary endpoint.
    ///
    /// Binary endpoints answer errors in free form, so the message falls back
    /// to an `error` field and then to the raw text.
    pub fn http_lenient(
        status: u16,
        status_text: impl Into<String>,
        url: impl Into<String>,
        body: Option<Body>,
    ) -> Self {
        let message = body
            .as_ref()
            .and_then(Body::lenient_message)
            .unwrap_or_else(|| generic_status_message(status));

        ApiError::Http {
            message,
            status,
            status_text: status_text.into(),
            url: url.into(),
            body,
        }
    }

    pub fn network(url: impl Into<String>, detail: impl Into<String>) -> Self {
        ApiError::Network {
            message: NETWORK_MESSAGE.to_string(),
            url: url.into(),
            detail: detail.into(),
        }
    }

    pub fn timeout(url: impl Into<String>, timeout: Duration) -> Self {
        ApiError::Timeout {
            message: TIMEOUT_MESSAGE.to_string(),
            url: url.into(),
            timeout,
        }
    }

    pub fn decode(status: u16, url: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        ApiError::Decode {
            message: format!("Unexpected response from the server: {}", detail),
            status,
            url: url.into(),
        }
    }

    /// HTTP status code; 0 when no response was received.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Http { status, .. } | ApiError::Decode { status, .. } => *status,
            ApiError::Network { .. } | ApiError::Timeout { .. } => 0,
        }
    }

    pub fn status_text(&self) -> &str {
        match self {
            ApiError::Http { status_text, .. } => status_text,
            ApiError::Network { .. } => "NetworkError",
            ApiError::Timeout { .. } => "Timeout",
            ApiError::Decode { .. } => "DecodeError",
        }
    }

    /// Resolved request URL.
    pub fn url(&self) -> &str {
        match self {
            ApiError::Http { url, .. }
            | ApiError::Network { url, .. }
            | ApiError::Timeout { url, .. }
            | ApiError::Decode { url, .. } => url,
        }
    }

    /// Raw response body, when one was received.
    pub fn body(&self) -> Option<&Body> {
        match self {
            ApiError::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Human-readable message intended for direct display.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Http { message, .. }
            | ApiError::Network { message, .. }
            | ApiError::Timeout { message, .. }
            | ApiError::Decode { message, .. } => message,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout { .. })
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }
}

fn generic_status_message(status: u16) -> String {
    format!("Request failed with status {}", status)
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_message_from_json_body() {
        let err = ApiError::http(
            409,
            "Conflict",
            "http://localhost:8080/api/ra/audits",
            Some(Body::Json(json!({"message": "Audit name already used"}))),
        );

        assert_eq!(err.to_string(), "Audit name already used");
        assert_eq!(err.status(), 409);
        assert_eq!(err.status_text(), "Conflict");
    }

    #[test]
    fn test_http_message_falls_back_to_status() {
        let err = ApiError::http(500, "Internal Server Error", "/x", Some(Body::Text("boom".into())));
        assert_eq!(err.message(), "Request failed with status 500");
    }

    #[test]
    fn test_lenient_message_uses_error_field_then_text() {
        let err = ApiError::http_lenient(
            400,
            "Bad Request",
            "/x",
            Some(Body::Json(json!({"error": "Missing parameter"}))),
        );
        assert_eq!(err.message(), "Missing parameter");

        let err = ApiError::http_lenient(502, "Bad Gateway", "/x", Some(Body::Text("upstream down".into())));
        assert_eq!(err.message(), "upstream down");
    }

    #[test]
    fn test_network_and_timeout_carry_zero_status() {
        let network = ApiError::network("http://localhost:8080/api/og", "connection refused");
        let timeout = ApiError::timeout("http://localhost:8080/api/og", Duration::from_secs(15));

        assert_eq!(network.status(), 0);
        assert_eq!(network.status_text(), "NetworkError");
        assert!(network.is_network());
        assert_eq!(timeout.status(), 0);
        assert_eq!(timeout.status_text(), "Timeout");
        assert!(timeout.is_timeout());
        assert_eq!(timeout.url(), "http://localhost:8080/api/og");
    }
}
