//! Response message extraction.
//!
//! Controller responses are loosely structured: JSON with one of a few
//! well-known message keys, or plain text. Extraction always yields a
//! displayable string; a parse failure falls back to the raw payload by
//! design, it is not an error.

use serde_json::Value;

/// Message keys in priority order.
const MESSAGE_KEYS: [&str; 3] = ["message", "msg", "status"];

/// Extracts a human-readable message from a response payload.
///
/// Returns the value of the first present key among `message`, `msg`, and
/// `status`; if the payload is not a JSON object or carries none of the keys,
/// returns the payload verbatim.
pub fn extract_message(raw: &str) -> String {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) else {
        return raw.to_string();
    };

    for key in MESSAGE_KEYS {
        match map.get(key) {
            Some(Value::String(s)) => return s.clone(),
            Some(other) => return other.to_string(),
            None => continue,
        }
    }

    raw.to_string()
}
