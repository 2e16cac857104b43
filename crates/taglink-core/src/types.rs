//! Core data types for discovered candidates, the active binding, and
//! dispatch outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a discovered candidate.
///
/// A candidate moves `Found` -> `Resolving` -> `Resolved`; a lost event
/// removes it from the pool entirely regardless of its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateState {
    /// Seen on the network, address not yet requested
    Found,

    /// Address resolution is in flight
    Resolving,

    /// Address obtained, candidate is selectable
    Resolved,

    /// Removed from the network (terminal, entry is deleted)
    Lost,
}

impl std::fmt::Display for CandidateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateState::Found => write!(f, "found"),
            CandidateState::Resolving => write!(f, "resolving"),
            CandidateState::Resolved => write!(f, "resolved"),
            CandidateState::Lost => write!(f, "lost"),
        }
    }
}

/// A controller instance discovered on the local network.
///
/// Keyed by its case-folded instance name; host, port, and URL are only
/// present once resolution has completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredCandidate {
    /// Case-folded instance name (unique within a session)
    pub name: String,

    /// Resolved host address
    pub host: Option<String>,

    /// Resolved service port
    pub port: Option<u16>,

    /// Synthesized base URL (`http://<host>:<port>/`)
    pub url: Option<String>,

    /// Current lifecycle state
    pub state: CandidateState,

    /// First discovered timestamp
    pub discovered_at: DateTime<Utc>,

    /// Last seen timestamp (updated on re-announcement)
    pub last_seen_at: DateTime<Utc>,
}

impl DiscoveredCandidate {
    /// Creates a new candidate in the `Found` state.
    pub fn found(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            host: None,
            port: None,
            url: None,
            state: CandidateState::Found,
            discovered_at: now,
            last_seen_at: now,
        }
    }

    /// Marks resolution as started.
    pub fn mark_resolving(&mut self) {
        self.state = CandidateState::Resolving;
        self.last_seen_at = Utc::now();
    }

    /// Installs a resolved address and promotes the candidate.
    pub fn mark_resolved(&mut self, host: String, port: u16, url: String) {
        self.host = Some(host);
        self.port = Some(port);
        self.url = Some(url);
        self.state = CandidateState::Resolved;
        self.last_seen_at = Utc::now();
    }

    /// Updates the last seen timestamp on a re-announcement.
    pub fn mark_seen(&mut self) {
        self.last_seen_at = Utc::now();
    }

    /// Whether this candidate can be selected as the active binding.
    pub fn is_selectable(&self) -> bool {
        self.state == CandidateState::Resolved && self.url.is_some()
    }
}

/// The single active binding to a controller.
///
/// At most one binding is active at any time. It is created by explicit
/// selection of a resolved candidate or by restoring persisted state at
/// startup, and destroyed by disconnect or by a lost event for its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Case-folded instance name of the bound controller
    pub name: String,

    /// Base URL of the bound controller (trailing slash included)
    pub url: String,

    /// Whether this binding has been written to the persisted store
    pub persisted: bool,
}

impl Binding {
    pub fn new(name: impl Into<String>, url: impl Into<String>, persisted: bool) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            persisted,
        }
    }
}

impl std::fmt::Display for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}

/// Outcome of a single dispatch call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiOutcome {
    /// HTTP status code of the response
    pub http_status: u16,

    /// Raw response body (success payload or error body)
    pub raw_body: String,

    /// Human-readable message extracted from the body
    pub message: String,

    /// Whether the status code was in the 2xx range
    pub success: bool,
}
