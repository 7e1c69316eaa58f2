//! Cryptographic primitives for Veildrive.
//!
//! This module provides:
//! - Key derivation using Argon2id
//! - Authenticated encryption using AES-256-GCM
//! - Wrapping of per-file keys under the session master key
//! - Secure random generation and binary/text encoding
//!
//! # Security Guarantees
//! - All key material is automatically zeroized on drop
//! - No plaintext or key material is ever logged
//! - Authentication failures are opaque: no partial plaintext escapes

pub mod aead;
pub mod encoding;
pub mod kdf;
pub mod keys;
pub mod random;
pub mod wrap;

pub use aead::{decrypt, encrypt, generate_nonce, Nonce, NONCE_SIZE, TAG_SIZE};
pub use kdf::{derive_key, verify_password, KdfParams};
pub use keys::{FileKey, MasterKey, Salt, KEY_LENGTH, SALT_LENGTH};
pub use wrap::{unwrap_key, wrap_key, WRAPPED_KEY_SIZE};
