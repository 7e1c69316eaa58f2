//! Common error types for Veildrive.

use thiserror::Error;

/// Top-level error type for Veildrive operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Key derivation rejected its input (bad password or salt).
    ///
    /// Fatal to the call; retrying with the same input cannot succeed.
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// Authentication tag did not verify on decrypt.
    ///
    /// Covers tampered ciphertext, a wrong key, and a wrong nonce alike;
    /// callers cannot distinguish the three.
    #[error("Cannot decrypt: wrong key or corrupted data")]
    Authentication,

    /// An operation was attempted before the session key was initialized.
    #[error("Encryption is not initialized")]
    NotReady,

    /// A blob claiming to be an envelope is structurally invalid.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Cryptographic operation failed for a non-authentication reason.
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Secret store operation failed.
    #[error("Keystore error: {0}")]
    Keystore(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
