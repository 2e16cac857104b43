//! Configuration types for the taglink client.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Discovery session settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Dispatch client settings
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Path of the persisted binding record
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            discovery: DiscoveryConfig::default(),
            dispatch: DispatchConfig::default(),
            store_path: default_store_path(),
        }
    }
}

impl AppConfig {
    /// Validates the whole configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.discovery.validate()?;
        self.dispatch.validate()?;
        Ok(())
    }
}

/// Configuration for the mDNS discovery session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// mDNS service type to browse for
    #[serde(default = "default_service_type")]
    pub service_type: String,

    /// Optional allow-list of instance names (case-insensitive).
    /// `None` accepts every instance of the service type.
    #[serde(default)]
    pub allowed_names: Option<Vec<String>>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            service_type: default_service_type(),
            allowed_names: None,
        }
    }
}

impl DiscoveryConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.service_type.is_empty() {
            return Err("service_type cannot be empty".to_string());
        }

        if !self.service_type.starts_with('_') {
            return Err(format!(
                "service_type must be a DNS-SD type like '_mbg._tcp.local.', got '{}'",
                self.service_type
            ));
        }

        if let Some(names) = &self.allowed_names {
            if names.is_empty() {
                return Err("allowed_names, when set, must not be empty".to_string());
            }
        }

        Ok(())
    }
}

/// Configuration for the dispatch client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// JSON field name carrying the tag identifier.
    /// Older controller firmware expects `batch-id` instead of `nfc_id`.
    #[serde(default = "default_id_field")]
    pub id_field: String,

    /// Fixed item name sent alongside every scan
    #[serde(default = "default_item_name")]
    pub item_name: String,

    /// Connect/read timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            id_field: default_id_field(),
            item_name: default_item_name(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl DispatchConfig {
    /// Returns the timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.id_field.is_empty() {
            return Err("id_field cannot be empty".to_string());
        }

        if self.timeout_ms == 0 {
            return Err("timeout_ms cannot be 0".to_string());
        }

        Ok(())
    }
}

// Default configuration values
fn default_service_type() -> String {
    "_mbg._tcp.local.".to_string()
}

fn default_id_field() -> String {
    "nfc_id".to_string()
}

fn default_item_name() -> String {
    "handheld-scan".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_store_path() -> PathBuf {
    PathBuf::from("taglink-binding.json")
}
