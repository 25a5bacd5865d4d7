//! # Error Types
//!
//! Errors raised by external transports.

use thiserror::Error;

/// Errors from the REST page transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("Server error {status}: {message}")]
    Server {
        /// HTTP-like status code.
        status: u16,
        /// Server-provided message.
        message: String,
    },

    /// The request never reached the server or the connection dropped.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("Malformed response: {0}")]
    Malformed(String),
}
