//! Session-level encryption engine for Veildrive.
//!
//! This module provides:
//! - The self-describing envelope container for encrypted files
//! - The session key manager that owns the master key lifecycle and
//!   performs per-file encryption and decryption
//!
//! # Architecture
//! The manager sits between the host application and the secret store,
//! keeping all key material on this side of the boundary. Plaintext bytes
//! go in and envelope blobs come out, and vice versa; the host only ever
//! moves opaque blobs.

pub mod envelope;
pub mod manager;

pub use envelope::{looks_like_envelope, pack, unpack, EncryptionMetadata, ENVELOPE_VERSION};
pub use manager::{SessionKeyManager, SessionState};
