//! Error types for the registry client.
//!
//! # Design
//! The registry reports failures as a non-XML body, so the only error the
//! client itself detects on the response path is `InvalidResponseBody`. It
//! carries the exact text so callers can read the upstream message.
//! Transport failures are passed through untouched in `Transport`.

use thiserror::Error;

/// Boxed error produced by an `HttpTransport` implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by `QueryClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client was constructed with an empty application id.
    #[error("application id must not be empty")]
    EmptyApplicationId,

    /// The configured base URL is not a usable absolute URL.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// The response body is not well-formed XML. `body` is the raw text.
    #[error("invalid response body ({reason}): {body}")]
    InvalidResponseBody { body: String, reason: String },

    /// The document is well-formed but does not have the registry's shape.
    #[error("unexpected response schema: {source}")]
    UnexpectedSchema {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// The transport failed before a response body was available.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),
}

impl ApiError {
    /// Raw response text for body-related failures.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::InvalidResponseBody { body, .. } | ApiError::UnexpectedSchema { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_body_exposes_raw_text() {
        let err = ApiError::InvalidResponseBody {
            body: "error".to_string(),
            reason: "no root element".to_string(),
        };
        assert_eq!(err.body(), Some("error"));
        assert_eq!(err.to_string(), "invalid response body (no root element): error");
    }

    #[test]
    fn construction_errors_have_no_body() {
        assert!(ApiError::EmptyApplicationId.body().is_none());
    }
}
