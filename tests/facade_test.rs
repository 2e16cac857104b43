//! Smoke tests for the assembled taglink client.

use taglink::Taglink;
use taglink_core::{AppConfig, DiscoveryConfig};
use taglink_dispatch::DispatchError;

fn config_in(dir: &tempfile::TempDir) -> AppConfig {
    AppConfig {
        store_path: dir.path().join("binding.json"),
        ..Default::default()
    }
}

#[test]
fn fresh_client_has_no_binding() {
    let dir = tempfile::tempdir().unwrap();
    let app = Taglink::new(config_in(&dir)).unwrap();

    assert!(app.load_persisted().unwrap().is_none());
    assert!(app.active_binding().is_none());
    assert!(app.candidates().is_empty());
    assert!(!app.is_discovering());
}

#[tokio::test]
async fn dispatch_without_binding_makes_no_network_call() {
    let dir = tempfile::tempdir().unwrap();
    let app = Taglink::new(config_in(&dir)).unwrap();

    let err = app.dispatch_id("crate-042").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DispatchError>(),
        Some(DispatchError::NoActiveBinding)
    ));
}

#[test]
fn select_unknown_candidate_fails() {
    let dir = tempfile::tempdir().unwrap();
    let app = Taglink::new(config_in(&dir)).unwrap();

    assert!(app.select("nope").is_err());
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        discovery: DiscoveryConfig {
            service_type: String::new(),
            allowed_names: None,
        },
        store_path: dir.path().join("binding.json"),
        ..Default::default()
    };

    assert!(Taglink::new(config).is_err());
}

#[test]
fn stop_discovery_when_not_running_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let app = Taglink::new(config_in(&dir)).unwrap();

    app.stop_discovery();
    app.stop_discovery();
    assert!(!app.is_discovering());
}
