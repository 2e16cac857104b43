//! Resolution bookkeeping.
//!
//! mDNS resolves a found service to an address asynchronously; the registry
//! must never have two resolutions in flight for the same candidate name, and
//! a resolution that completes after the candidate was lost must be
//! discarded. `Resolver` tracks the in-flight markers that enforce both
//! rules. It holds no lock of its own: the registry owns it inside its
//! single mutex.

use std::collections::HashSet;

/// Synthesizes the base URL for a resolved controller address.
pub fn service_url(host: &str, port: u16) -> String {
    format!("http://{}:{}/", host, port)
}

/// In-flight resolution markers, keyed by case-folded candidate name.
#[derive(Debug, Default)]
pub struct Resolver {
    in_flight: HashSet<String>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a resolution as started. Returns `false` when one is already in
    /// flight for this name, in which case the caller must not start another.
    pub fn begin(&mut self, name: &str) -> bool {
        self.in_flight.insert(name.to_string())
    }

    /// Clears the marker on completion, failure, or loss. Returns `true` if
    /// a resolution was actually in flight; a completion arriving without a
    /// marker lost the race against a lost event and must be discarded.
    pub fn finish(&mut self, name: &str) -> bool {
        self.in_flight.remove(name)
    }

    /// Whether a resolution is currently in flight for this name.
    pub fn is_resolving(&self, name: &str) -> bool {
        self.in_flight.contains(name)
    }

    /// Drops every marker. Called when the session stops so that resolves
    /// completing afterwards are discarded.
    pub fn clear(&mut self) {
        self.in_flight.clear();
    }

    /// Number of resolutions currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_url() {
        assert_eq!(service_url("10.0.0.5", 8080), "http://10.0.0.5:8080/");
    }

    #[test]
    fn test_no_duplicate_in_flight() {
        let mut resolver = Resolver::new();
        assert!(resolver.begin("mypi"));
        assert!(!resolver.begin("mypi"));
        assert_eq!(resolver.in_flight_count(), 1);

        assert!(resolver.finish("mypi"));
        assert!(!resolver.is_resolving("mypi"));
        assert!(resolver.begin("mypi"));
    }

    #[test]
    fn test_finish_without_begin_is_discarded() {
        let mut resolver = Resolver::new();
        assert!(!resolver.finish("mypi"));
    }

    #[test]
    fn test_clear_drops_all_markers() {
        let mut resolver = Resolver::new();
        resolver.begin("mypi");
        resolver.begin("mypi2");
        resolver.clear();
        assert_eq!(resolver.in_flight_count(), 0);
        assert!(!resolver.finish("mypi"));
    }
}
