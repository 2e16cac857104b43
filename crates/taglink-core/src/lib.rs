//! # Taglink Core
//!
//! Core types, error handling, configuration, and the persisted binding store
//! for the taglink handheld client.
//!
//! This crate provides the foundational building blocks shared by the
//! discovery and dispatch crates:
//!
//! - **Types**: `DiscoveredCandidate`, `Binding`, `ApiOutcome`, and the
//!   candidate state machine.
//! - **Errors**: `thiserror`-based error types for the store and
//!   configuration failure modes.
//! - **Configuration**: serde-backed configuration with defaults and
//!   validation, covering discovery, dispatch, and persistence.
//! - **Store**: the `BindingStore` abstraction the binding registry uses to
//!   persist the active binding, with a JSON-file implementation and an
//!   in-memory one for tests.

pub mod config;
pub mod error;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use config::{AppConfig, DiscoveryConfig, DispatchConfig};
pub use error::{StoreError, StoreResult};
pub use store::{BindingStore, JsonFileStore, MemoryStore, PersistedBinding};
pub use types::{ApiOutcome, Binding, CandidateState, DiscoveredCandidate};
