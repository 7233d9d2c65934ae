//! Error types for the cloud API client.
//!
//! # Design
//! A non-ok status is reported with its numeric code only; the failure body is
//! never read. Transport and JSON errors keep the underlying error as their
//! `source()` so callers can downcast to the original cause.

use thiserror::Error;

/// Errors returned by `CloudClient` operations and `parse_*` methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP round trip could not be completed (DNS, connect, I/O).
    #[error("HTTP transport failed")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server answered with a status outside 2xx.
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    /// A 2xx response body could not be decoded into the response envelope.
    #[error("failed to decode response body")]
    Decode(#[source] serde_json::Error),

    /// The request payload could not be serialized to JSON.
    #[error("failed to encode request body")]
    Encode(#[source] serde_json::Error),
}

impl ApiError {
    /// The HTTP status code, for `Http` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Errors from building a client out of the process environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {0} is not valid unicode")]
    InvalidVar(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn http_error_message_names_status() {
        let err = ApiError::Http { status: 404 };
        assert_eq!(err.to_string(), "HTTP error! status: 404");
        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());
    }

    #[test]
    fn decode_error_keeps_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = ApiError::Decode(json_err);
        assert!(err.source().is_some());
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
    }
}
