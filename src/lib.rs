//! # Taglink
//!
//! Handheld-side client core for dispatching scanned tag identifiers to a
//! controller discovered on the local network.
//!
//! [`Taglink`] wires the pieces together: the mDNS discovery session, the
//! binding registry with its persisted store, and the dispatch client. UI
//! layers call the operations here and subscribe to [`RegistryEvent`]
//! notifications; they never touch the underlying components directly.
//!
//! ## Example
//!
//! ```no_run
//! use taglink::Taglink;
//! use taglink_core::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let app = Taglink::new(AppConfig::default())?;
//!     app.load_persisted()?;
//!     app.start_discovery()?;
//!
//!     // ... candidate appears and is selected ...
//!     let outcome = app.dispatch_id("crate-042").await?;
//!     println!("{}", outcome.message);
//!     Ok(())
//! }
//! ```

use anyhow::{anyhow, Context, Result};
use async_channel::Receiver;
use std::sync::Arc;
use taglink_core::{ApiOutcome, AppConfig, Binding, DiscoveredCandidate, JsonFileStore};
use taglink_discovery::{BindingRegistry, DiscoverySession, RegistryEvent};
use taglink_dispatch::DispatchClient;

pub use taglink_core::CandidateState;
pub use taglink_dispatch::{decode_text_record, extract_message};

/// The assembled taglink client.
pub struct Taglink {
    registry: Arc<BindingRegistry>,
    session: DiscoverySession,
    client: DispatchClient,
}

impl Taglink {
    /// Builds the client from configuration: persisted store, registry,
    /// discovery session, and dispatch client.
    pub fn new(config: AppConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow!("Invalid configuration: {}", e))?;

        let store = Arc::new(JsonFileStore::new(&config.store_path));
        let registry = Arc::new(BindingRegistry::new(store));
        let session = DiscoverySession::new(&config.discovery, registry.clone());
        let client =
            DispatchClient::new(config.dispatch.clone()).context("Failed to build dispatch client")?;

        Ok(Self {
            registry,
            session,
            client,
        })
    }

    /// Restores a previously saved binding, if any. Call before starting
    /// discovery so a saved controller stays bound across restarts.
    pub fn load_persisted(&self) -> Result<Option<Binding>> {
        self.registry
            .load_persisted()
            .context("Failed to load persisted binding")
    }

    /// Starts the discovery session. No-op when already running.
    pub fn start_discovery(&self) -> Result<()> {
        self.session.start().context("Failed to start discovery")
    }

    /// Stops the discovery session. No-op when not running.
    pub fn stop_discovery(&self) {
        self.session.stop();
    }

    /// Whether discovery is currently running.
    pub fn is_discovering(&self) -> bool {
        self.session.is_running()
    }

    /// Names of selectable candidates, sorted.
    pub fn candidates(&self) -> Vec<String> {
        self.registry.candidates()
    }

    /// Snapshot of every candidate in the pool.
    pub fn candidate_details(&self) -> Vec<DiscoveredCandidate> {
        self.registry.candidate_details()
    }

    /// Promotes a resolved candidate to the active binding and persists it.
    pub fn select(&self, name: &str) -> Result<Binding> {
        self.registry
            .select(name)
            .with_context(|| format!("Failed to select '{}'", name))
    }

    /// Clears the active binding and its persisted record.
    pub fn disconnect(&self) -> Result<()> {
        self.registry.disconnect().context("Failed to disconnect")
    }

    /// The currently active binding, if any.
    pub fn active_binding(&self) -> Option<Binding> {
        self.registry.active_binding()
    }

    /// Change-notification receiver for UI layers.
    pub fn events(&self) -> Receiver<RegistryEvent> {
        self.registry.event_receiver()
    }

    /// Decodes a raw tag payload and dispatches it to the bound controller.
    pub async fn dispatch_tag(&self, payload: &[u8]) -> Result<ApiOutcome> {
        let binding = self.registry.active_binding();
        let outcome = self.client.dispatch_payload(binding.as_ref(), payload).await?;
        Ok(outcome)
    }

    /// Dispatches an already-decoded tag identifier (e.g. a tag-id hex
    /// string for tags without a text record).
    pub async fn dispatch_id(&self, tag_id: &str) -> Result<ApiOutcome> {
        let binding = self.registry.active_binding();
        let outcome = self.client.dispatch(binding.as_ref(), tag_id).await?;
        Ok(outcome)
    }
}

impl Drop for Taglink {
    fn drop(&mut self) {
        self.session.stop();
    }
}
