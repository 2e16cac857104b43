//! Error types for tag decoding and dispatch.

use thiserror::Error;

/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Errors from tag decoding and the dispatch client.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The tag payload does not follow the text-record layout
    #[error("Malformed tag payload: {0}")]
    MalformedPayload(String),

    /// Dispatch was attempted without an active binding; no network I/O
    /// has happened
    #[error("No active controller binding")]
    NoActiveBinding,

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// Transport-level failure (connect, timeout, malformed URL). Opaque by
    /// design; there is no retry.
    #[error("Dispatch failed: {0}")]
    DispatchFailed(String),
}

impl From<reqwest::Error> for DispatchError {
    fn from(e: reqwest::Error) -> Self {
        DispatchError::DispatchFailed(e.to_string())
    }
}
