//! Single-shot dispatch client.
//!
//! One HTTP POST per scan, carrying the decoded tag identifier and the fixed
//! item name to the bound controller. No retry, no backoff, no cancellation:
//! once issued, a request runs to completion or until its timeout elapses.

use crate::decoder::decode_text_record;
use crate::error::{DispatchError, Result};
use crate::extract::extract_message;
use serde_json::Value;
use taglink_core::{ApiOutcome, Binding, DispatchConfig};
use tracing::{debug, info};

/// Path of the scan endpoint, relative to the binding's base URL.
const DISPATCH_PATH: &str = "api/scan-dispatch";

/// HTTP client for the controller's scan-dispatch endpoint.
#[derive(Debug, Clone)]
pub struct DispatchClient {
    client: reqwest::Client,
    config: DispatchConfig,
}

impl DispatchClient {
    /// Creates a client with the configured connect/read timeout.
    pub fn new(config: DispatchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .build()
            .map_err(|e| DispatchError::ClientBuild(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Posts one tag identifier to the bound controller.
    ///
    /// Fails fast with [`DispatchError::NoActiveBinding`] before any network
    /// I/O when no binding is active. Non-2xx responses are still an
    /// [`ApiOutcome`]; only transport-level failures are errors.
    pub async fn dispatch(&self, binding: Option<&Binding>, tag_id: &str) -> Result<ApiOutcome> {
        let binding = binding.ok_or(DispatchError::NoActiveBinding)?;
        let url = format!("{}{}", binding.url, DISPATCH_PATH);

        let mut body = serde_json::Map::new();
        body.insert(
            self.config.id_field.clone(),
            Value::String(tag_id.to_string()),
        );
        body.insert(
            "item_name".to_string(),
            Value::String(self.config.item_name.clone()),
        );

        debug!(url, tag_id, "Dispatching scan");
        let response = self
            .client
            .post(&url)
            .json(&Value::Object(body))
            .send()
            .await?;

        let status = response.status();
        let raw_body = response.text().await.unwrap_or_default();
        let raw_body = if !status.is_success() && raw_body.is_empty() {
            "Unknown error".to_string()
        } else {
            raw_body
        };

        let outcome = ApiOutcome {
            http_status: status.as_u16(),
            message: extract_message(&raw_body),
            raw_body,
            success: status.is_success(),
        };

        info!(
            status = outcome.http_status,
            success = outcome.success,
            "Dispatch completed"
        );
        Ok(outcome)
    }

    /// Decodes a raw tag payload and dispatches the decoded text.
    pub async fn dispatch_payload(
        &self,
        binding: Option<&Binding>,
        payload: &[u8],
    ) -> Result<ApiOutcome> {
        let tag_id = decode_text_record(payload)?;
        self.dispatch(binding, &tag_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_active_binding_fails_before_io() {
        let client = DispatchClient::new(DispatchConfig::default()).unwrap();
        let result = client.dispatch(None, "tag-1").await;
        assert!(matches!(result, Err(DispatchError::NoActiveBinding)));
    }

    #[tokio::test]
    async fn test_malformed_payload_fails_before_io() {
        let client = DispatchClient::new(DispatchConfig::default()).unwrap();
        let binding = Binding::new("mypi", "http://10.0.0.5:8080/", true);
        let result = client.dispatch_payload(Some(&binding), &[]).await;
        assert!(matches!(result, Err(DispatchError::MalformedPayload(_))));
    }
}
