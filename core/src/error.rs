//! Error types for the AbuseIPDB client.
//!
//! # Design
//! Failures are split by where they happen. `Validation` is raised while a
//! request is being built and never reaches the network. `Transport` wraps the
//! ureq error untouched. `Request` is any response outside 200-299 and always
//! keeps the raw body, even when the error envelope cannot be parsed. `Decode`
//! is a 2xx response whose body does not match the expected shape.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by every `Client` operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection, DNS, TLS, timeout or body-read failure from the transport.
    #[error(transparent)]
    Transport(#[from] ureq::Error),

    /// The API answered with a status outside 200-299.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// A caller-supplied option is out of bounds. No request was sent.
    #[error("{0}")]
    Validation(String),

    /// A successful response body could not be decoded.
    #[error("abuseipdb: unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A local file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn validation(message: &str) -> Self {
        Error::Validation(message.to_string())
    }

    /// The `RequestError` carried by this error, if the API rejected the call.
    pub fn as_request_error(&self) -> Option<&RequestError> {
        match self {
            Error::Request(e) => Some(e),
            _ => None,
        }
    }
}

/// A response from the API whose status is outside 200-299.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub status: u16,
    /// `detail` entries of the error envelope, in order. Empty when the body
    /// is not an error envelope.
    pub details: Vec<String>,
    /// Response body exactly as received.
    pub raw: String,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    detail: String,
}

impl RequestError {
    /// Build the error from a fully read response body.
    pub fn from_body(status: u16, headers: Vec<(String, String)>, raw: String) -> Self {
        let details = match serde_json::from_str::<ErrorEnvelope>(&raw) {
            Ok(envelope) => envelope.errors.into_iter().map(|e| e.detail).collect(),
            Err(_) => Vec::new(),
        };
        Self {
            status,
            details,
            raw,
            headers,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "abuseipdb: api request failed with status code {}\n{}",
            self.status, self.raw
        )
    }
}

impl std::error::Error for RequestError {}

#[cfg(test)]
mod tests {
    use super::*;

    const ENVELOPE: &str = r#"{"errors":[{"detail":"example 1","status":402},{"detail":"example 2","status":402}]}"#;

    #[test]
    fn request_error_display_is_status_then_raw_body() {
        let err = RequestError {
            status: 402,
            details: vec!["example 1".to_string(), "example 2".to_string()],
            raw: ENVELOPE.to_string(),
            headers: Vec::new(),
        };

        assert_eq!(
            err.to_string(),
            format!("abuseipdb: api request failed with status code 402\n{ENVELOPE}")
        );
    }

    #[test]
    fn from_body_extracts_details_in_order() {
        let err = RequestError::from_body(402, Vec::new(), ENVELOPE.to_string());
        assert_eq!(err.details, vec!["example 1", "example 2"]);
        assert_eq!(err.raw, ENVELOPE);
    }

    #[test]
    fn from_body_keeps_raw_when_not_json() {
        let err = RequestError::from_body(502, Vec::new(), "<html>Bad Gateway</html>".to_string());
        assert!(err.details.is_empty());
        assert_eq!(err.raw, "<html>Bad Gateway</html>");
    }

    #[test]
    fn from_body_with_empty_error_list() {
        let err = RequestError::from_body(500, Vec::new(), r#"{"errors":[]}"#.to_string());
        assert!(err.details.is_empty());
    }

    #[test]
    fn request_error_display_passes_through_top_level_error() {
        let err: Error = RequestError::from_body(401, Vec::new(), "denied".to_string()).into();
        assert_eq!(err.to_string(), "abuseipdb: api request failed with status code 401\ndenied");
        assert_eq!(err.as_request_error().map(|e| e.status), Some(401));
    }

    #[test]
    fn validation_displays_bare_message() {
        let err = Error::validation("limit must be greater than 1");
        assert_eq!(err.to_string(), "limit must be greater than 1");
        assert!(err.as_request_error().is_none());
    }
}
