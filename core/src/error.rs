//! Error types for the booking client.
//!
//! # Design
//! `Validation` never reaches the network. `Request` carries the HTTP status of
//! a non-2xx response and the message shown to the user: the response body when
//! the server sent one, otherwise a generic `Request failed: {status}` line.
//! `Network` covers transport failures such as a refused connection. Pages
//! display all three the same way, as a single line of text.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required field was blank or a date did not parse. No request was sent.
    #[error("{0}")]
    Validation(String),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Request { status: u16, message: String },

    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded into the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Build a `Request` error from a failed response, falling back to a
    /// generic message when the body is blank.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("Request failed: {status}")
        } else {
            body.to_string()
        };
        ApiError::Request { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised by the durable key-value store behind the session.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
