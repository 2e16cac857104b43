//! Tag decoding and single-shot dispatch to the bound controller.
//!
//! Three small pieces:
//!
//! - [`decoder`]: decodes the NDEF well-known text-record payload read from a
//!   tag into its UTF-8 text.
//! - [`extract`]: pulls a displayable message out of a loosely structured
//!   JSON response body, never failing.
//! - [`client`]: performs exactly one HTTP POST per scan to the bound
//!   controller's dispatch endpoint. No retries, no backoff.

pub mod client;
pub mod decoder;
pub mod error;
pub mod extract;

pub use client::DispatchClient;
pub use decoder::{decode_text_record, encode_text_record};
pub use error::{DispatchError, Result};
pub use extract::extract_message;
