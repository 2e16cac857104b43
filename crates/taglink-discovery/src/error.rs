//! Error types for discovery and binding management.

use taglink_core::StoreError;
use thiserror::Error;

/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Errors that can occur during discovery and selection.
///
/// Per-candidate resolution failures are not represented here: a candidate
/// whose resolution fails simply never enters the resolved pool.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// mDNS service daemon failed to initialize
    #[error("Failed to initialize mDNS daemon: {0}")]
    MdnsInitFailed(String),

    /// The underlying platform browse could not begin; the session
    /// auto-stops on this failure
    #[error("Failed to browse for service type '{service_type}': {reason}")]
    BrowseFailed { service_type: String, reason: String },

    /// Selection named a candidate that is not in the pool
    #[error("Unknown candidate: {0}")]
    UnknownCandidate(String),

    /// Selection named a candidate whose address is not yet resolved
    #[error("Candidate '{0}' has not been resolved yet")]
    CandidateNotResolved(String),

    /// The persisted binding store failed
    #[error("Binding store error: {0}")]
    Store(#[from] StoreError),
}
