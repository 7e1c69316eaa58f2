//! Wrapping of per-file keys under the session master key.
//!
//! Structurally the same AEAD as file content encryption, kept as a
//! distinct operation because it handles key material rather than file
//! bytes and uses a nonce independent of the file's own.

use zeroize::Zeroize;

use crate::aead::{self, Nonce, TAG_SIZE};
use crate::keys::{FileKey, MasterKey, KEY_LENGTH};
use veildrive_common::{Error, Result};

/// Size of a wrapped key: the raw key plus the GCM tag.
pub const WRAPPED_KEY_SIZE: usize = KEY_LENGTH + TAG_SIZE;

/// Encrypt a file key under the master key.
///
/// # Postconditions
/// - Returns WRAPPED_KEY_SIZE bytes safe to persist alongside ciphertext
pub fn wrap_key(file_key: &FileKey, master_key: &MasterKey, nonce: &Nonce) -> Result<Vec<u8>> {
    aead::encrypt(master_key.as_bytes(), nonce, file_key.as_bytes())
}

/// Decrypt a wrapped key back into a usable file key.
///
/// # Errors
/// - Returns `Error::Authentication` if the wrap does not verify under
///   this master key and nonce, or if the unwrapped material is not a
///   valid key
pub fn unwrap_key(wrapped: &[u8], master_key: &MasterKey, nonce: &Nonce) -> Result<FileKey> {
    let mut raw = aead::decrypt(master_key.as_bytes(), nonce, wrapped)?;

    let file_key = FileKey::from_slice(&raw).map_err(|_| Error::Authentication);
    raw.zeroize();
    file_key
}
