//! Self-describing container for encrypted files.
//!
//! Layout, preserved bit-exact for interop with previously stored data:
//!
//! ```text
//! offset 0..4    u32 little-endian = L (metadata segment length)
//! offset 4..4+L  UTF-8 JSON: {"iv": b64, "keyIv": b64, "wrappedKey": b64, "version": 1}
//! offset 4+L..   AEAD ciphertext, trailing 16-byte tag included
//! ```
//!
//! Detection treats anything outside 10 <= L <= 1024 as "not one of ours"
//! so legacy plaintext files pass through undamaged.

use serde::{Deserialize, Serialize};

use veildrive_common::{Error, Result};
use veildrive_crypto::{encoding, Nonce, NONCE_SIZE};

/// Current envelope format version.
pub const ENVELOPE_VERSION: u32 = 1;

/// Length-prefix header size in bytes.
const HEADER_SIZE: usize = 4;

/// Smallest metadata segment the detector accepts.
const MIN_METADATA_LEN: usize = 10;

/// Largest metadata segment the detector accepts.
const MAX_METADATA_LEN: usize = 1024;

/// Per-file encryption metadata embedded in the envelope.
///
/// Field names are the wire format; do not rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionMetadata {
    /// Base64 nonce for the file ciphertext.
    pub iv: String,
    /// Base64 nonce for the key wrap.
    pub key_iv: String,
    /// Base64 file key, wrapped under the master key.
    pub wrapped_key: String,
    /// Format version.
    pub version: u32,
}

impl EncryptionMetadata {
    /// Build metadata from the raw parts of one encryption.
    pub fn new(iv: &Nonce, key_iv: &Nonce, wrapped_key: &[u8]) -> Self {
        Self {
            iv: encoding::encode(iv),
            key_iv: encoding::encode(key_iv),
            wrapped_key: encoding::encode(wrapped_key),
            version: ENVELOPE_VERSION,
        }
    }

    /// Decode the file nonce.
    pub fn iv_bytes(&self) -> Result<Nonce> {
        decode_nonce(&self.iv)
    }

    /// Decode the key-wrap nonce.
    pub fn key_iv_bytes(&self) -> Result<Nonce> {
        decode_nonce(&self.key_iv)
    }

    /// Decode the wrapped file key.
    pub fn wrapped_key_bytes(&self) -> Result<Vec<u8>> {
        encoding::decode(&self.wrapped_key)
            .map_err(|_| Error::MalformedEnvelope("Invalid base64 in wrapped key".to_string()))
    }
}

fn decode_nonce(text: &str) -> Result<Nonce> {
    let bytes = encoding::decode(text)
        .map_err(|_| Error::MalformedEnvelope("Invalid base64 in nonce".to_string()))?;

    if bytes.len() != NONCE_SIZE {
        return Err(Error::MalformedEnvelope(format!(
            "Invalid nonce length: expected {}, got {}",
            NONCE_SIZE,
            bytes.len()
        )));
    }

    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&bytes);
    Ok(nonce)
}

/// Pack ciphertext and its metadata into one envelope blob.
pub fn pack(ciphertext: &[u8], metadata: &EncryptionMetadata) -> Result<Vec<u8>> {
    let metadata_bytes =
        serde_json::to_vec(metadata).map_err(|e| Error::Serialization(e.to_string()))?;

    let mut blob = Vec::with_capacity(HEADER_SIZE + metadata_bytes.len() + ciphertext.len());
    blob.extend_from_slice(&(metadata_bytes.len() as u32).to_le_bytes());
    blob.extend_from_slice(&metadata_bytes);
    blob.extend_from_slice(ciphertext);

    Ok(blob)
}

/// Split an envelope blob back into ciphertext and metadata.
///
/// # Errors
/// - Returns `Error::MalformedEnvelope` if the buffer is shorter than the
///   header, the declared length overruns the buffer, or the metadata
///   segment is not valid JSON for this format
pub fn unpack(blob: &[u8]) -> Result<(Vec<u8>, EncryptionMetadata)> {
    if blob.len() < HEADER_SIZE {
        return Err(Error::MalformedEnvelope(
            "Missing length header".to_string(),
        ));
    }

    let declared = u32::from_le_bytes([blob[0], blob[1], blob[2], blob[3]]) as usize;
    if HEADER_SIZE + declared > blob.len() {
        return Err(Error::MalformedEnvelope(format!(
            "Declared metadata length {} exceeds buffer",
            declared
        )));
    }

    let metadata: EncryptionMetadata =
        serde_json::from_slice(&blob[HEADER_SIZE..HEADER_SIZE + declared])
            .map_err(|e| Error::MalformedEnvelope(format!("Invalid metadata: {}", e)))?;

    Ok((blob[HEADER_SIZE + declared..].to_vec(), metadata))
}

/// Heuristic check for whether a blob is one of our envelopes.
///
/// Distinguishes our own past output from legacy plaintext: the length
/// prefix must land in the plausible metadata range and the metadata
/// segment must parse with all four fields present. Anything that fails
/// is simply not ours; this function never returns an error.
pub fn looks_like_envelope(blob: &[u8]) -> bool {
    if blob.len() < 10 {
        return false;
    }

    let declared = u32::from_le_bytes([blob[0], blob[1], blob[2], blob[3]]) as usize;
    if !(MIN_METADATA_LEN..=MAX_METADATA_LEN).contains(&declared) {
        return false;
    }
    if HEADER_SIZE + declared > blob.len() {
        return false;
    }

    serde_json::from_slice::<EncryptionMetadata>(&blob[HEADER_SIZE..HEADER_SIZE + declared]).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_metadata() -> EncryptionMetadata {
        EncryptionMetadata::new(&[1u8; 12], &[2u8; 12], &[3u8; 48])
    }

    #[test]
    fn test_pack_unpack_roundtrip() {
        let metadata = sample_metadata();
        let ciphertext = b"opaque ciphertext bytes";

        let blob = pack(ciphertext, &metadata).unwrap();
        let (recovered_ct, recovered_meta) = unpack(&blob).unwrap();

        assert_eq!(recovered_ct, ciphertext);
        assert_eq!(recovered_meta, metadata);
    }

    #[test]
    fn test_layout_is_length_prefixed_json() {
        let metadata = sample_metadata();
        let blob = pack(b"ct", &metadata).unwrap();

        let declared = u32::from_le_bytes([blob[0], blob[1], blob[2], blob[3]]) as usize;
        let segment = &blob[4..4 + declared];

        let json: serde_json::Value = serde_json::from_slice(segment).unwrap();
        assert!(json.get("iv").is_some());
        assert!(json.get("keyIv").is_some());
        assert!(json.get("wrappedKey").is_some());
        assert_eq!(json.get("version"), Some(&serde_json::json!(1)));
        assert_eq!(&blob[4 + declared..], b"ct");
    }

    #[test]
    fn test_unpack_rejects_short_buffer() {
        assert!(matches!(
            unpack(b"ab"),
            Err(Error::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_unpack_rejects_overrunning_length() {
        let metadata = sample_metadata();
        let mut blob = pack(b"ciphertext", &metadata).unwrap();

        // Declare more metadata than the buffer holds
        let len = blob.len() as u32;
        blob[..4].copy_from_slice(&len.to_le_bytes());

        assert!(matches!(
            unpack(&blob),
            Err(Error::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_metadata_nonce_accessors() {
        let metadata = sample_metadata();

        assert_eq!(metadata.iv_bytes().unwrap(), [1u8; 12]);
        assert_eq!(metadata.key_iv_bytes().unwrap(), [2u8; 12]);
        assert_eq!(metadata.wrapped_key_bytes().unwrap(), vec![3u8; 48]);
    }

    #[test]
    fn test_metadata_rejects_bad_nonce() {
        let mut metadata = sample_metadata();
        metadata.iv = encoding::encode(&[1u8; 8]); // wrong length

        assert!(matches!(
            metadata.iv_bytes(),
            Err(Error::MalformedEnvelope(_))
        ));

        metadata.iv = "!!!".to_string(); // not base64
        assert!(matches!(
            metadata.iv_bytes(),
            Err(Error::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_detection_accepts_fresh_envelope() {
        let blob = pack(b"", &sample_metadata()).unwrap();
        assert!(looks_like_envelope(&blob));

        let blob = pack(&[0u8; 4096], &sample_metadata()).unwrap();
        assert!(looks_like_envelope(&blob));
    }

    #[test]
    fn test_detection_rejects_plaintext() {
        let text = b"The quick brown fox jumps over the lazy dog, repeatedly, \
                     and at some length, as English prose tends to do.";
        assert!(!looks_like_envelope(text));
    }

    #[test]
    fn test_detection_rejects_short_buffers() {
        assert!(!looks_like_envelope(b""));
        assert!(!looks_like_envelope(b"123456789"));
    }

    #[test]
    fn test_detection_rejects_corrupted_length() {
        let mut blob = pack(b"ciphertext", &sample_metadata()).unwrap();
        blob[..4].copy_from_slice(&2000u32.to_le_bytes());

        assert!(!looks_like_envelope(&blob));
    }

    #[test]
    fn test_detection_rejects_missing_fields() {
        let segment = br#"{"iv": "AAAA", "version": 1}"#;
        let mut blob = Vec::new();
        blob.extend_from_slice(&(segment.len() as u32).to_le_bytes());
        blob.extend_from_slice(segment);
        blob.extend_from_slice(b"ciphertext");

        assert!(!looks_like_envelope(&blob));
    }

    proptest! {
        #[test]
        fn prop_pack_unpack_roundtrip(ciphertext in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let metadata = sample_metadata();
            let blob = pack(&ciphertext, &metadata).unwrap();

            let (recovered_ct, recovered_meta) = unpack(&blob).unwrap();
            prop_assert_eq!(recovered_ct, ciphertext);
            prop_assert_eq!(recovered_meta, metadata);
        }

        #[test]
        fn prop_detection_never_panics(blob in proptest::collection::vec(any::<u8>(), 0..256)) {
            let _ = looks_like_envelope(&blob);
        }
    }
}
