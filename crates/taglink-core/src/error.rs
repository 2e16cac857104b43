//! Error types for the core crate.

use thiserror::Error;

/// Result type alias for persisted-store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors from the persisted binding store.
///
/// Store failures are never fatal to the caller: a missing or unreadable
/// record degrades to "no persisted binding", and write failures are surfaced
/// so the registry can report them.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying filesystem failure
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored record could not be serialized or deserialized
    #[error("Malformed persisted record: {0}")]
    Malformed(#[from] serde_json::Error),
}
