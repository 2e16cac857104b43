//! mDNS discovery and binding management for taglink controllers.
//!
//! This crate locates controller instances advertised over mDNS/DNS-SD and
//! maintains the single active binding the handheld client dispatches to:
//!
//! 1. The [`DiscoverySession`] browses for one fixed service type and feeds
//!    found/resolved/lost events into the registry.
//! 2. The [`Resolver`] bookkeeping guarantees at most one in-flight
//!    resolution per candidate name and discards resolutions that lose the
//!    race against a lost event.
//! 3. The [`BindingRegistry`] owns the candidate pool and the active binding,
//!    persists the binding through a [`taglink_core::BindingStore`], and
//!    notifies subscribers of every state change.
//!
//! All mutation funnels through the registry behind a single mutex, so
//! platform callback threads and the caller's own thread can hit it
//! concurrently.

pub mod error;
pub mod registry;
pub mod resolver;
pub mod session;

pub use error::{DiscoveryError, Result};
pub use registry::{BindingRegistry, RegistryEvent};
pub use resolver::{service_url, Resolver};
pub use session::{DiscoverySession, NameFilter};
