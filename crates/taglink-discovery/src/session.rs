//! mDNS discovery session.
//!
//! Browses for one fixed service type and feeds found/resolved/lost events
//! into the [`BindingRegistry`]. The session keeps no business state of its
//! own beyond what `stop()` needs: the daemon handle and the pump task.

use crate::error::{DiscoveryError, Result};
use crate::registry::BindingRegistry;
use mdns_sd::{ServiceDaemon, ServiceEvent as MdnsEvent};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use taglink_core::DiscoveryConfig;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Predicate applied to found instance names.
///
/// The default accepts every instance of the configured service type; the
/// allow-list form matches names case-insensitively.
#[derive(Debug, Clone)]
pub enum NameFilter {
    AcceptAll,
    AllowList(HashSet<String>),
}

impl NameFilter {
    /// Builds the filter from the optional configured allow-list.
    pub fn from_allowed(allowed: Option<&[String]>) -> Self {
        match allowed {
            None => NameFilter::AcceptAll,
            Some(names) => {
                NameFilter::AllowList(names.iter().map(|n| n.to_lowercase()).collect())
            }
        }
    }

    /// Whether a found instance name passes the filter.
    pub fn accepts(&self, name: &str) -> bool {
        match self {
            NameFilter::AcceptAll => true,
            NameFilter::AllowList(names) => names.contains(&name.to_lowercase()),
        }
    }
}

/// Browse session for the controller service type.
pub struct DiscoverySession {
    service_type: String,
    filter: Arc<NameFilter>,
    registry: Arc<BindingRegistry>,
    running: Arc<AtomicBool>,
    daemon: Mutex<Option<ServiceDaemon>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DiscoverySession {
    /// Creates a session for the configured service type.
    pub fn new(config: &DiscoveryConfig, registry: Arc<BindingRegistry>) -> Self {
        Self {
            service_type: config.service_type.clone(),
            filter: Arc::new(NameFilter::from_allowed(config.allowed_names.as_deref())),
            registry,
            running: Arc::new(AtomicBool::new(false)),
            daemon: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    /// Starts browsing. Calling while already running is a no-op.
    ///
    /// If the underlying browse cannot begin, the session auto-stops and the
    /// failure is returned.
    pub fn start(&self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let daemon = match ServiceDaemon::new() {
            Ok(daemon) => daemon,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(DiscoveryError::MdnsInitFailed(e.to_string()));
            }
        };

        let receiver = match daemon.browse(&self.service_type) {
            Ok(receiver) => receiver,
            Err(e) => {
                let _ = daemon.shutdown();
                self.running.store(false, Ordering::SeqCst);
                return Err(DiscoveryError::BrowseFailed {
                    service_type: self.service_type.clone(),
                    reason: e.to_string(),
                });
            }
        };

        info!(service_type = self.service_type, "Discovery started");
        *self.daemon.lock() = Some(daemon);

        let service_type = self.service_type.clone();
        let filter = self.filter.clone();
        let registry = self.registry.clone();
        let running = self.running.clone();

        let task = tokio::spawn(async move {
            loop {
                match receiver.recv_async().await {
                    Ok(event) => {
                        if !running.load(Ordering::SeqCst) {
                            break;
                        }
                        handle_event(event, &service_type, &filter, &registry);
                    }
                    Err(e) => {
                        // The channel closes when the daemon shuts down; only
                        // an unexpected closure is a session failure.
                        if running.swap(false, Ordering::SeqCst) {
                            error!(error = %e, "Discovery event stream failed");
                            registry.notify_discovery_failed(e.to_string());
                        }
                        break;
                    }
                }
            }
            debug!("Discovery pump stopped");
        });

        *self.task.lock() = Some(task);
        Ok(())
    }

    /// Stops browsing. Safe to call from any thread, idempotent, and never
    /// waits for in-flight resolves; resolves completing after this call are
    /// discarded by the registry.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Some(daemon) = self.daemon.lock().take() {
            if let Err(e) = daemon.shutdown() {
                warn!(error = %e, "mDNS daemon shutdown failed");
            }
        }

        if let Some(task) = self.task.lock().take() {
            task.abort();
        }

        self.registry.on_discovery_stopped();
        info!(service_type = self.service_type, "Discovery stopped");
    }

    /// Whether the session is currently browsing.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for DiscoverySession {
    fn drop(&mut self) {
        if self.running.load(Ordering::SeqCst) {
            if let Some(daemon) = self.daemon.lock().take() {
                let _ = daemon.shutdown();
            }
        }
    }
}

/// Routes one mDNS event into the registry.
fn handle_event(
    event: MdnsEvent,
    service_type: &str,
    filter: &NameFilter,
    registry: &BindingRegistry,
) {
    match event {
        MdnsEvent::ServiceFound(ty, fullname) => {
            if ty != service_type {
                debug!(ty, fullname, "Ignoring service of foreign type");
                return;
            }
            let name = instance_name(&fullname, &ty);
            if !filter.accepts(name) {
                debug!(name, "Instance name filtered out");
                return;
            }
            registry.on_candidate_found(name);
        }

        MdnsEvent::ServiceResolved(info) => {
            let name = instance_name(info.get_fullname(), info.get_type());
            if !filter.accepts(name) {
                return;
            }

            let host = info
                .get_addresses()
                .iter()
                .find(|addr| addr.is_ipv4())
                .or_else(|| info.get_addresses().iter().next())
                .map(|addr| addr.to_string());

            match host {
                Some(host) => {
                    registry.on_candidate_resolved(name, &host, info.get_port());
                }
                None => {
                    registry.on_resolve_failed(name, "no address in resolution");
                }
            }
        }

        MdnsEvent::ServiceRemoved(_, fullname) => {
            let name = instance_name(&fullname, service_type);
            registry.on_candidate_lost(name);
        }

        MdnsEvent::SearchStarted(ty) => {
            debug!(ty, "Search started");
        }

        MdnsEvent::SearchStopped(ty) => {
            debug!(ty, "Search stopped");
        }

        _ => {}
    }
}

/// Extracts the instance name from a DNS-SD full name
/// (`mypi._mbg._tcp.local.` -> `mypi`).
fn instance_name<'a>(fullname: &'a str, service_type: &str) -> &'a str {
    fullname
        .strip_suffix(service_type)
        .map(|s| s.trim_end_matches('.'))
        .unwrap_or(fullname)
}
