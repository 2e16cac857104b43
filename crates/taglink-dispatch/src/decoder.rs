//! NDEF well-known text-record payload decoding.
//!
//! Layout: the low six bits of the status byte give the length `L` of the
//! language-code field; bytes `[1, 1+L)` are the language code; the rest is
//! UTF-8 text. Record type and TNF gating happen upstream, at the platform
//! reader; this decoder only ever sees text-record payloads.

use crate::error::{DispatchError, Result};

const LANG_LEN_MASK: u8 = 0x3F;

/// Decodes a text-record payload into its UTF-8 text.
pub fn decode_text_record(payload: &[u8]) -> Result<String> {
    let status = *payload
        .first()
        .ok_or_else(|| DispatchError::MalformedPayload("empty payload".to_string()))?;

    let lang_len = (status & LANG_LEN_MASK) as usize;
    let text_start = 1 + lang_len;
    if text_start > payload.len() {
        return Err(DispatchError::MalformedPayload(format!(
            "language code of {} bytes exceeds payload of {} bytes",
            lang_len,
            payload.len()
        )));
    }

    String::from_utf8(payload[text_start..].to_vec())
        .map_err(|e| DispatchError::MalformedPayload(format!("invalid UTF-8 text: {}", e)))
}

/// Builds a text-record payload, the inverse of [`decode_text_record`].
/// Used by tests and tag writers.
pub fn encode_text_record(text: &str, lang_code: &str) -> Result<Vec<u8>> {
    if lang_code.len() > LANG_LEN_MASK as usize {
        return Err(DispatchError::MalformedPayload(format!(
            "language code '{}' longer than {} bytes",
            lang_code, LANG_LEN_MASK
        )));
    }

    let mut payload = Vec::with_capacity(1 + lang_code.len() + text.len());
    payload.push(lang_code.len() as u8);
    payload.extend_from_slice(lang_code.as_bytes());
    payload.extend_from_slice(text.as_bytes());
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_payload() {
        // Language length 2 ("en"), text "Hi"
        let payload = [0x02, b'e', b'n', b'H', b'i'];
        assert_eq!(decode_text_record(&payload).unwrap(), "Hi");
    }

    #[test]
    fn test_decode_empty_language_code() {
        let payload = [0x00, b'o', b'k'];
        assert_eq!(decode_text_record(&payload).unwrap(), "ok");
    }

    #[test]
    fn test_decode_empty_text() {
        let payload = [0x02, b'e', b'n'];
        assert_eq!(decode_text_record(&payload).unwrap(), "");
    }

    #[test]
    fn test_decode_ignores_encoding_flag_bit() {
        // Bit 7 set, language length still 2
        let payload = [0x82, b'e', b'n', b'H', b'i'];
        assert_eq!(decode_text_record(&payload).unwrap(), "Hi");
    }

    #[test]
    fn test_empty_payload_is_malformed() {
        assert!(matches!(
            decode_text_record(&[]),
            Err(DispatchError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_language_length_overrun_is_malformed() {
        // Claims a 5-byte language code in a 3-byte payload
        let payload = [0x05, b'e', b'n'];
        assert!(matches!(
            decode_text_record(&payload),
            Err(DispatchError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let payload = [0x00, 0xFF, 0xFE];
        assert!(matches!(
            decode_text_record(&payload),
            Err(DispatchError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_round_trip() {
        for text in ["Hi", "", "crate-042", "ünïcode"] {
            let payload = encode_text_record(text, "en").unwrap();
            assert_eq!(decode_text_record(&payload).unwrap(), text);
        }
    }

    #[test]
    fn test_encode_rejects_oversized_language_code() {
        let long_code = "x".repeat(64);
        assert!(encode_text_record("Hi", &long_code).is_err());
    }
}
