//! Shared failure taxonomy for upstream gateway clients.

use thiserror::Error;

/// A failed upstream call. One attempt per invocation, never retried here;
/// callers decide the user-facing message.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The HTTP request could not be sent or the response body not read.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a non-2xx status.
    #[error("upstream returned status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Upstream error message, or a generic placeholder.
        message: String,
    },

    /// A 2xx response that carried no usable payload.
    #[error("upstream response malformed: {0}")]
    Malformed(String),

    /// A 2xx response whose binary payload failed to decode.
    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
}
