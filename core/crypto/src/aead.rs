//! Authenticated encryption using AES-256-GCM.
//!
//! Every encryption implicitly authenticates integrity through the GCM
//! tag; there is no separate MAC step. Nonces are 96-bit and travel
//! outside the ciphertext (in envelope metadata), so both operations take
//! the nonce explicitly.

use aes_gcm::{
    aead::{generic_array::GenericArray, Aead, KeyInit},
    Aes256Gcm,
};

use crate::keys::KEY_LENGTH;
use crate::random::random_array;
use veildrive_common::{Error, Result};

/// Nonce size for AES-256-GCM (12 bytes, 96 bits).
pub const NONCE_SIZE: usize = 12;

/// Authentication tag size (16 bytes).
pub const TAG_SIZE: usize = 16;

/// AEAD nonce as raw bytes.
pub type Nonce = [u8; NONCE_SIZE];

/// Generate a fresh random nonce.
///
/// # Security
/// A (key, nonce) pair must never be reused. Callers get a fresh nonce
/// for every encryption; nothing in this crate derives or counts nonces.
pub fn generate_nonce() -> Nonce {
    random_array()
}

/// Encrypt plaintext with an explicit nonce.
///
/// # Preconditions
/// - `nonce` must be unique for this key
/// - `plaintext` can be any size, including empty
///
/// # Postconditions
/// - Returns ciphertext || tag
/// - The ciphertext length is plaintext length + TAG_SIZE
///
/// # Errors
/// - Returns error if encryption fails
pub fn encrypt(key: &[u8; KEY_LENGTH], nonce: &Nonce, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(GenericArray::from_slice(key));

    cipher
        .encrypt(GenericArray::from_slice(nonce), plaintext)
        .map_err(|_| Error::Crypto("Encryption failed".to_string()))
}

/// Decrypt ciphertext with an explicit nonce.
///
/// # Preconditions
/// - `ciphertext` must be at least TAG_SIZE bytes
/// - Ciphertext format: encrypted_data || tag
///
/// # Postconditions
/// - Returns the original plaintext
/// - Verifies the authentication tag before returning
///
/// # Errors
/// - Returns `Error::Authentication` on any tag mismatch: tampered data,
///   wrong key, or wrong nonce all look identical to the caller
///
/// # Security
/// - Authenticates before decrypting; no partial plaintext ever escapes
pub fn decrypt(key: &[u8; KEY_LENGTH], nonce: &Nonce, ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < TAG_SIZE {
        return Err(Error::Authentication);
    }

    let cipher = Aes256Gcm::new(GenericArray::from_slice(key));

    cipher
        .decrypt(GenericArray::from_slice(nonce), ciphertext)
        .map_err(|_| Error::Authentication)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = [42u8; KEY_LENGTH];
        let nonce = generate_nonce();
        let plaintext = b"Hello, World!";

        let ciphertext = encrypt(&key, &nonce, plaintext).unwrap();
        let decrypted = decrypt(&key, &nonce, &ciphertext).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_ciphertext_size() {
        let key = [42u8; KEY_LENGTH];
        let nonce = generate_nonce();
        let plaintext = b"Test message";

        let ciphertext = encrypt(&key, &nonce, plaintext).unwrap();

        // Size should be plaintext + tag
        assert_eq!(ciphertext.len(), plaintext.len() + TAG_SIZE);
    }

    #[test]
    fn test_wrong_key_fails() {
        let key1 = [1u8; KEY_LENGTH];
        let key2 = [2u8; KEY_LENGTH];
        let nonce = generate_nonce();
        let plaintext = b"Secret data";

        let ciphertext = encrypt(&key1, &nonce, plaintext).unwrap();
        let result = decrypt(&key2, &nonce, &ciphertext);

        assert!(matches!(result, Err(Error::Authentication)));
    }

    #[test]
    fn test_wrong_nonce_fails() {
        let key = [42u8; KEY_LENGTH];
        let nonce = [1u8; NONCE_SIZE];
        let other = [2u8; NONCE_SIZE];
        let plaintext = b"Secret data";

        let ciphertext = encrypt(&key, &nonce, plaintext).unwrap();
        let result = decrypt(&key, &other, &ciphertext);

        assert!(matches!(result, Err(Error::Authentication)));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = [42u8; KEY_LENGTH];
        let nonce = generate_nonce();
        let plaintext = b"Important data";

        let mut ciphertext = encrypt(&key, &nonce, plaintext).unwrap();
        // Tamper with the ciphertext
        ciphertext[5] ^= 0xFF;

        let result = decrypt(&key, &nonce, &ciphertext);
        assert!(matches!(result, Err(Error::Authentication)));
    }

    #[test]
    fn test_every_bit_flip_is_detected() {
        let key = [42u8; KEY_LENGTH];
        let nonce = generate_nonce();
        let plaintext = b"abc";

        let ciphertext = encrypt(&key, &nonce, plaintext).unwrap();

        for byte in 0..ciphertext.len() {
            for bit in 0..8 {
                let mut tampered = ciphertext.clone();
                tampered[byte] ^= 1 << bit;

                assert!(
                    matches!(decrypt(&key, &nonce, &tampered), Err(Error::Authentication)),
                    "flip at byte {} bit {} went undetected",
                    byte,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_truncated_ciphertext_fails() {
        let key = [42u8; KEY_LENGTH];
        let nonce = generate_nonce();

        let ciphertext = encrypt(&key, &nonce, b"data").unwrap();
        let result = decrypt(&key, &nonce, &ciphertext[..TAG_SIZE - 1]);

        assert!(matches!(result, Err(Error::Authentication)));
    }

    #[test]
    fn test_empty_plaintext() {
        let key = [42u8; KEY_LENGTH];
        let nonce = generate_nonce();
        let plaintext = b"";

        let ciphertext = encrypt(&key, &nonce, plaintext).unwrap();
        assert_eq!(ciphertext.len(), TAG_SIZE);

        let decrypted = decrypt(&key, &nonce, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_large_plaintext() {
        let key = [42u8; KEY_LENGTH];
        let nonce = generate_nonce();
        let plaintext = vec![0xABu8; 1_000_000]; // 1 MB

        let ciphertext = encrypt(&key, &nonce, &plaintext).unwrap();
        let decrypted = decrypt(&key, &nonce, &ciphertext).unwrap();

        assert_eq!(decrypted, plaintext);
    }
}
