//! Binary/text codec for secrets crossing text-only storage.
//!
//! The host application persists raw key and salt bytes through storage
//! layers that only accept text. Standard base64 is used so the encoded
//! form matches the base64 fields inside envelope metadata.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use veildrive_common::{Error, Result};

/// Encode raw bytes as base64 text.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode base64 text back to raw bytes.
///
/// Exact inverse of [`encode`]: `decode(encode(b)) == b` for all byte
/// sequences.
///
/// # Errors
/// - Returns error if the input is not valid base64
pub fn decode(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text)
        .map_err(|e| Error::InvalidInput(format!("Invalid base64: {}", e)))
}
