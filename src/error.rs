// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Error types for the alert relay

use thiserror::Error;

/// Result type for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Errors raised while handling an alert event.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Missing or invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    #[error("event data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("event data is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The event document does not contain a field the handler must rewrite
    #[error("event document has no field `{0}`")]
    MissingField(String),

    /// Connection, TLS or body read failure
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from a Google API
    #[error("{service} API error ({status}): {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("secret error: {0}")]
    Secret(String),

    #[error("pattern compilation failed: {0}")]
    Pattern(String),
}

impl RelayError {
    pub(crate) fn api(service: &'static str, status: reqwest::StatusCode, message: String) -> Self {
        RelayError::Api {
            service,
            status: status.as_u16(),
            message,
        }
    }
}
