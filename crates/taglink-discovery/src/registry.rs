//! Binding registry: candidate pool, active binding, persistence, and
//! change notifications.
//!
//! The registry is the single writer for all shared discovery state. One
//! mutex guards the pool, the in-flight resolution markers, and the active
//! binding, so invariants hold under concurrent callback delivery:
//!
//! - at most one resolution in flight per candidate name
//! - at most one pool entry per case-folded name
//! - zero or one active binding
//! - losing the active binding's candidate clears the binding and the
//!   persisted record before any new selection can be offered
//!
//! Persisted-store reads and writes happen under the same lock, keeping the
//! on-disk record in step with the in-memory binding.

use crate::error::{DiscoveryError, Result};
use crate::resolver::{service_url, Resolver};
use async_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use taglink_core::{Binding, BindingStore, DiscoveredCandidate, PersistedBinding};
use tracing::{debug, info, warn};

/// Maximum number of change events to buffer for subscribers
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Change notification emitted by the registry.
#[derive(Debug, Clone)]
pub enum RegistryEvent {
    /// The candidate pool changed (entry added, resolved, or removed)
    CandidatesChanged,

    /// The active binding changed; `None` means disconnected
    ActiveBindingChanged(Option<Binding>),

    /// The candidate backing the active binding was lost. The binding and
    /// the persisted record are already cleared when this fires.
    ActiveBindingLost(String),

    /// The discovery session failed; discovery has stopped
    DiscoveryFailed(String),
}

struct Inner {
    pool: HashMap<String, DiscoveredCandidate>,
    resolver: Resolver,
    active: Option<Binding>,
    has_persisted: bool,
}

/// Registry of discovered candidates and the single active binding.
pub struct BindingRegistry {
    inner: Mutex<Inner>,
    store: Arc<dyn BindingStore>,
    event_tx: Sender<RegistryEvent>,
    event_rx: Receiver<RegistryEvent>,
}

impl BindingRegistry {
    /// Creates a registry backed by the given persisted store.
    pub fn new(store: Arc<dyn BindingStore>) -> Self {
        let (event_tx, event_rx) = async_channel::bounded(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Mutex::new(Inner {
                pool: HashMap::new(),
                resolver: Resolver::new(),
                active: None,
                has_persisted: false,
            }),
            store,
            event_tx,
            event_rx,
        }
    }

    /// Returns the change-event receiver for subscribers.
    pub fn event_receiver(&self) -> Receiver<RegistryEvent> {
        self.event_rx.clone()
    }

    /// Handles a found event. Returns `true` when resolution should proceed
    /// for this name; `false` when it is already resolving or resolved.
    pub fn on_candidate_found(&self, name: &str) -> bool {
        let name = fold(name);
        let mut events = Vec::new();

        let start_resolve = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;

            match inner.pool.entry(name.clone()) {
                Entry::Occupied(mut entry) => {
                    // Re-announcement of a known candidate; nothing to start.
                    entry.get_mut().mark_seen();
                    false
                }
                Entry::Vacant(entry) => {
                    if inner.resolver.begin(&name) {
                        let mut candidate = DiscoveredCandidate::found(&name);
                        candidate.mark_resolving();
                        entry.insert(candidate);
                        events.push(RegistryEvent::CandidatesChanged);
                        true
                    } else {
                        false
                    }
                }
            }
        };

        if start_resolve {
            debug!(name, "Candidate found, resolving");
        }
        self.emit(events);
        start_resolve
    }

    /// Handles a completed resolution. A completion for a name that has since
    /// been lost is discarded; loss is always authoritative.
    pub fn on_candidate_resolved(&self, name: &str, host: &str, port: u16) {
        let name = fold(name);
        let url = service_url(host, port);
        let mut events = Vec::new();

        {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            let was_in_flight = inner.resolver.finish(&name);

            match inner.pool.get_mut(&name) {
                Some(candidate) if was_in_flight => {
                    candidate.mark_resolved(host.to_string(), port, url.clone());
                    info!(name, url, "Candidate resolved");
                    events.push(RegistryEvent::CandidatesChanged);

                    self.maybe_auto_select(inner, &name, &url, &mut events);
                }
                Some(candidate) => {
                    // Address refresh for an already-resolved candidate.
                    let changed = candidate.url.as_deref() != Some(url.as_str());
                    candidate.mark_resolved(host.to_string(), port, url);
                    if changed {
                        events.push(RegistryEvent::CandidatesChanged);
                    }
                }
                None => {
                    debug!(name, "Discarding resolution for lost candidate");
                }
            }
        }

        self.emit(events);
    }

    /// Handles a failed resolution; the candidate never becomes selectable.
    pub fn on_resolve_failed(&self, name: &str, reason: &str) {
        let name = fold(name);
        let mut events = Vec::new();

        {
            let mut inner = self.inner.lock();
            inner.resolver.finish(&name);
            if inner.pool.remove(&name).is_some() {
                events.push(RegistryEvent::CandidatesChanged);
            }
        }

        warn!(name, reason, "Resolution failed");
        self.emit(events);
    }

    /// Handles a lost event. Removes the candidate regardless of state; if it
    /// backs the active binding, clears the binding and the persisted record
    /// before notifying.
    pub fn on_candidate_lost(&self, name: &str) {
        let name = fold(name);
        let mut events = Vec::new();

        {
            let mut inner = self.inner.lock();
            inner.resolver.finish(&name);

            if inner.pool.remove(&name).is_some() {
                debug!(name, "Candidate lost");
                events.push(RegistryEvent::CandidatesChanged);
            }

            if inner.active.as_ref().is_some_and(|b| b.name == name) {
                inner.active = None;
                inner.has_persisted = false;
                if let Err(e) = self.store.clear() {
                    warn!(error = %e, "Failed to clear persisted binding");
                }
                info!(name, "Active binding lost");
                events.push(RegistryEvent::ActiveBindingChanged(None));
                events.push(RegistryEvent::ActiveBindingLost(name));
            }
        }

        self.emit(events);
    }

    /// Promotes a resolved candidate to the active binding and persists it.
    pub fn select(&self, name: &str) -> Result<Binding> {
        let name = fold(name);
        let mut events = Vec::new();

        let binding = {
            let mut inner = self.inner.lock();

            let url = match inner.pool.get(&name) {
                None => return Err(DiscoveryError::UnknownCandidate(name)),
                Some(candidate) => match &candidate.url {
                    Some(url) => url.clone(),
                    None => return Err(DiscoveryError::CandidateNotResolved(name)),
                },
            };

            self.install_binding(&mut inner, name, url, &mut events)?
        };

        self.emit(events);
        Ok(binding)
    }

    /// Restores a previously saved binding at startup.
    ///
    /// The restored binding does not need to be in the current pool; it stays
    /// authoritative until a lost event arrives for its name.
    pub fn load_persisted(&self) -> Result<Option<Binding>> {
        let mut events = Vec::new();

        let binding = {
            let mut inner = self.inner.lock();
            match self.store.load()? {
                Some(record) => {
                    let binding = Binding::new(fold(&record.name), record.url, true);
                    info!(name = binding.name, url = binding.url, "Restored persisted binding");
                    inner.active = Some(binding.clone());
                    inner.has_persisted = true;
                    events.push(RegistryEvent::ActiveBindingChanged(Some(binding.clone())));
                    Some(binding)
                }
                None => None,
            }
        };

        self.emit(events);
        Ok(binding)
    }

    /// Clears the active binding and the persisted record. The candidate pool
    /// is kept so rediscovery can immediately re-offer candidates.
    pub fn disconnect(&self) -> Result<()> {
        let mut events = Vec::new();

        {
            let mut inner = self.inner.lock();
            self.store.clear()?;
            inner.has_persisted = false;
            if inner.active.take().is_some() {
                info!("Disconnected from controller");
                events.push(RegistryEvent::ActiveBindingChanged(None));
            }
        }

        self.emit(events);
        Ok(())
    }

    /// Names of candidates that are currently selectable, sorted.
    pub fn candidates(&self) -> Vec<String> {
        let inner = self.inner.lock();
        let mut names: Vec<String> = inner
            .pool
            .values()
            .filter(|c| c.is_selectable())
            .map(|c| c.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Snapshot of every candidate in the pool, sorted by name.
    pub fn candidate_details(&self) -> Vec<DiscoveredCandidate> {
        let inner = self.inner.lock();
        let mut candidates: Vec<DiscoveredCandidate> = inner.pool.values().cloned().collect();
        candidates.sort_by(|a, b| a.name.cmp(&b.name));
        candidates
    }

    /// The currently active binding, if any.
    pub fn active_binding(&self) -> Option<Binding> {
        self.inner.lock().active.clone()
    }

    /// Number of resolutions currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.inner.lock().resolver.in_flight_count()
    }

    /// Called when the discovery session stops. Drops every in-flight marker
    /// (resolves completing afterwards are discarded) and removes candidates
    /// that never finished resolving.
    pub fn on_discovery_stopped(&self) {
        let mut events = Vec::new();

        {
            let mut inner = self.inner.lock();
            inner.resolver.clear();
            let before = inner.pool.len();
            inner.pool.retain(|_, c| c.is_selectable());
            if inner.pool.len() != before {
                events.push(RegistryEvent::CandidatesChanged);
            }
        }

        self.emit(events);
    }

    /// Forwards a session-fatal discovery failure to subscribers.
    pub fn notify_discovery_failed(&self, reason: String) {
        self.emit(vec![RegistryEvent::DiscoveryFailed(reason)]);
    }

    /// Auto-selects only when the pool just went from empty to exactly one
    /// resolved candidate, no binding is active, and nothing is persisted.
    /// Every other situation defers to an explicit `select`.
    fn maybe_auto_select(
        &self,
        inner: &mut Inner,
        name: &str,
        url: &str,
        events: &mut Vec<RegistryEvent>,
    ) {
        if inner.active.is_some() || inner.has_persisted {
            return;
        }
        let resolved = inner.pool.values().filter(|c| c.is_selectable()).count();
        if resolved != 1 {
            return;
        }

        match self.install_binding(inner, name.to_string(), url.to_string(), events) {
            Ok(binding) => info!(name = binding.name, "Auto-selected sole candidate"),
            Err(e) => warn!(name, error = %e, "Auto-select failed"),
        }
    }

    /// Persists and installs a binding. Must be called with the lock held.
    fn install_binding(
        &self,
        inner: &mut Inner,
        name: String,
        url: String,
        events: &mut Vec<RegistryEvent>,
    ) -> Result<Binding> {
        self.store.save(&PersistedBinding {
            name: name.clone(),
            url: url.clone(),
        })?;

        let binding = Binding::new(name, url, true);
        info!(name = binding.name, url = binding.url, "Binding selected");
        inner.active = Some(binding.clone());
        inner.has_persisted = true;
        events.push(RegistryEvent::ActiveBindingChanged(Some(binding.clone())));
        Ok(binding)
    }

    fn emit(&self, events: Vec<RegistryEvent>) {
        for event in events {
            if let Err(e) = self.event_tx.try_send(event) {
                debug!(error = %e, "Dropping registry event");
            }
        }
    }
}

/// Candidate names are keyed case-insensitively; fold once on entry.
fn fold(name: &str) -> String {
    name.to_lowercase()
}
