//! Session key management.
//!
//! The session key manager is the one stateful object in the encryption
//! core. It owns the master key for the lifetime of a logged-in session,
//! orchestrates derivation, restore, and teardown, and performs per-file
//! encryption and decryption. The host application constructs one at
//! login and clears or drops it at logout; keys are zeroized either way.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use veildrive_common::{Error, Result};
use veildrive_crypto::{
    aead, derive_key, unwrap_key, wrap_key, FileKey, KdfParams, MasterKey, Salt,
};
use veildrive_keystore::SecretStore;

use crate::envelope::{self, EncryptionMetadata};

/// State of the session key manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No master key in memory; file operations are refused.
    Uninitialized,
    /// A cached key is being fetched and reimported.
    Restoring,
    /// Master key present; file operations available.
    Ready,
}

/// Key material owned by the manager.
///
/// Written only under the write lock so readers never observe a
/// half-restored key.
struct KeySlot {
    master_key: Option<MasterKey>,
    salt: Option<Salt>,
}

/// Session key manager.
///
/// Many concurrent callers may encrypt and decrypt; `initialize`,
/// `restore_from_cache`, `clear`, and `purge_all` are the only writers
/// and are serialized by the inner lock. State transitions are published
/// on a watch channel so callers can block on readiness with a timeout.
pub struct SessionKeyManager {
    store: Arc<dyn SecretStore>,
    kdf_params: KdfParams,
    slot: RwLock<KeySlot>,
    state_tx: watch::Sender<SessionState>,
    state_rx: watch::Receiver<SessionState>,
}

impl SessionKeyManager {
    /// Create an uninitialized manager backed by the given secret store.
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self::with_params(store, KdfParams::default())
    }

    /// Create with explicit KDF parameters.
    pub fn with_params(store: Arc<dyn SecretStore>, kdf_params: KdfParams) -> Self {
        let (state_tx, state_rx) = watch::channel(SessionState::Uninitialized);

        Self {
            store,
            kdf_params,
            slot: RwLock::new(KeySlot {
                master_key: None,
                salt: None,
            }),
            state_tx,
            state_rx,
        }
    }

    /// Get the current state.
    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Check if file operations are available.
    pub fn is_ready(&self) -> bool {
        self.state() == SessionState::Ready
    }

    /// Set up encryption from the user's password.
    ///
    /// Uses the account salt already held in memory or in the store;
    /// generates and persists a fresh one only for a brand-new account.
    /// The derived key's exported form is handed to the store's cache so
    /// a process restart can restore the session without the password.
    ///
    /// # Postconditions
    /// - Manager is `Ready`
    /// - Store holds the salt and the cached exported key
    ///
    /// # Errors
    /// - KDF errors propagate unchanged
    /// - Store failures propagate as keystore errors
    pub async fn initialize(&self, password: &str) -> Result<()> {
        debug!(store = self.store.name(), "Initializing session key");

        let mut slot = self.slot.write().await;

        let salt = match slot.salt.clone() {
            Some(salt) => salt,
            None => match self.store.load_salt().await? {
                Some(bytes) => Salt::from_slice(&bytes)?,
                None => {
                    let salt = Salt::generate();
                    self.store.store_salt(salt.as_bytes()).await?;
                    debug!("Generated new account salt");
                    salt
                }
            },
        };

        let master_key = derive_key(password.as_bytes(), &salt, &self.kdf_params)?;
        self.store.store_cached_key(&master_key.export()).await?;

        slot.master_key = Some(master_key);
        slot.salt = Some(salt);
        drop(slot);

        self.state_tx.send_replace(SessionState::Ready);
        info!("Session key initialized");
        Ok(())
    }

    /// Reimport a previously exported master key without rederiving.
    ///
    /// Used to survive a process restart without re-prompting for the
    /// password. Malformed input is recovered locally: the unusable cache
    /// is purged, the manager lands in `Uninitialized`, and `false` is
    /// returned so the caller falls back to asking for the password.
    pub async fn restore_from_cache(&self, key_bytes: &[u8], salt_bytes: &[u8]) -> bool {
        let mut slot = self.slot.write().await;
        self.state_tx.send_replace(SessionState::Restoring);

        match (MasterKey::from_slice(key_bytes), Salt::from_slice(salt_bytes)) {
            (Ok(master_key), Ok(salt)) => {
                slot.master_key = Some(master_key);
                slot.salt = Some(salt);
                drop(slot);

                self.state_tx.send_replace(SessionState::Ready);
                info!("Session key restored from cache");
                true
            }
            _ => {
                slot.master_key = None;
                slot.salt = None;
                drop(slot);

                self.state_tx.send_replace(SessionState::Uninitialized);
                if let Err(e) = self.store.delete_cached_key().await {
                    warn!(error = %e, "Failed to purge unusable key cache");
                }
                warn!("Cached key material was malformed; cache purged");
                false
            }
        }
    }

    /// Fetch the cached key and salt from the store and restore from them.
    ///
    /// Returns `Ok(false)` when no cache exists or the cached material is
    /// unusable; only store access failures are errors.
    pub async fn restore(&self) -> Result<bool> {
        self.state_tx.send_replace(SessionState::Restoring);
        debug!(store = self.store.name(), "Restoring session key");

        let key_bytes = match self.store.load_cached_key().await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                self.state_tx.send_replace(SessionState::Uninitialized);
                debug!("No cached session key to restore");
                return Ok(false);
            }
            Err(e) => {
                self.state_tx.send_replace(SessionState::Uninitialized);
                return Err(e);
            }
        };

        let salt_bytes = match self.store.load_salt().await {
            Ok(bytes) => bytes.unwrap_or_default(),
            Err(e) => {
                self.state_tx.send_replace(SessionState::Uninitialized);
                return Err(e);
            }
        };

        Ok(self.restore_from_cache(&key_bytes, &salt_bytes).await)
    }

    /// Block until the manager is `Ready` or the timeout elapses.
    ///
    /// Returns `false` on timeout rather than waiting indefinitely.
    pub async fn wait_until_ready(&self, timeout: Duration) -> bool {
        let mut rx = self.state_rx.clone();

        let wait = async move {
            loop {
                if *rx.borrow_and_update() == SessionState::Ready {
                    return true;
                }
                if rx.changed().await.is_err() {
                    return false;
                }
            }
        };

        matches!(tokio::time::timeout(timeout, wait).await, Ok(true))
    }

    /// Encrypt one file's bytes under a fresh file key.
    ///
    /// # Postconditions
    /// - Returns AEAD ciphertext and the metadata needed to decrypt it;
    ///   [`envelope::pack`] combines the two for storage
    /// - File key and both nonces are fresh random; nothing is reused
    ///
    /// # Errors
    /// - `Error::NotReady` if no session key is present
    pub async fn encrypt_file(&self, plaintext: &[u8]) -> Result<(Vec<u8>, EncryptionMetadata)> {
        let slot = self.slot.read().await;
        let master_key = slot.master_key.as_ref().ok_or(Error::NotReady)?;

        let file_key = FileKey::generate();
        let iv = aead::generate_nonce();
        let key_iv = aead::generate_nonce();

        let ciphertext = aead::encrypt(file_key.as_bytes(), &iv, plaintext)?;
        let wrapped_key = wrap_key(&file_key, master_key, &key_iv)?;

        debug!(plaintext_len = plaintext.len(), "File encrypted");
        Ok((ciphertext, EncryptionMetadata::new(&iv, &key_iv, &wrapped_key)))
    }

    /// Decrypt one file's bytes using its envelope metadata.
    ///
    /// # Errors
    /// - `Error::NotReady` if no session key is present
    /// - `Error::MalformedEnvelope` if metadata fields don't decode
    /// - `Error::Authentication` propagates unchanged from unwrap/decrypt
    pub async fn decrypt_file(
        &self,
        ciphertext: &[u8],
        metadata: &EncryptionMetadata,
    ) -> Result<Vec<u8>> {
        let slot = self.slot.read().await;
        let master_key = slot.master_key.as_ref().ok_or(Error::NotReady)?;

        let iv = metadata.iv_bytes()?;
        let key_iv = metadata.key_iv_bytes()?;
        let wrapped_key = metadata.wrapped_key_bytes()?;

        let file_key = unwrap_key(&wrapped_key, master_key, &key_iv)?;
        let plaintext = aead::decrypt(file_key.as_bytes(), &iv, ciphertext)?;

        debug!(plaintext_len = plaintext.len(), "File decrypted");
        Ok(plaintext)
    }

    /// Encrypt and pack in one step.
    pub async fn seal_envelope(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let (ciphertext, metadata) = self.encrypt_file(plaintext).await?;
        envelope::pack(&ciphertext, &metadata)
    }

    /// Unpack and decrypt in one step.
    pub async fn open_envelope(&self, blob: &[u8]) -> Result<Vec<u8>> {
        let (ciphertext, metadata) = envelope::unpack(blob)?;
        self.decrypt_file(&ciphertext, &metadata).await
    }

    /// Drop the master key and purge the collaborator's key cache.
    ///
    /// The salt is deliberately retained, in memory and in the store, so
    /// the next login with the same password re-derives the identical
    /// master key.
    ///
    /// # Postconditions
    /// - Manager is `Uninitialized`; the in-memory key is zeroized
    /// - Store no longer holds a cached key
    pub async fn clear(&self) -> Result<()> {
        {
            let mut slot = self.slot.write().await;
            // Dropped key is zeroized via ZeroizeOnDrop
            slot.master_key = None;
        }
        self.state_tx.send_replace(SessionState::Uninitialized);

        self.store.delete_cached_key().await?;
        info!("Session key cleared");
        Ok(())
    }

    /// [`clear`](Self::clear) plus salt destruction.
    ///
    /// Irreversible: every envelope sealed under this account becomes
    /// undecryptable. Only for full account teardown.
    pub async fn purge_all(&self) -> Result<()> {
        {
            let mut slot = self.slot.write().await;
            slot.master_key = None;
            slot.salt = None;
        }
        self.state_tx.send_replace(SessionState::Uninitialized);

        self.store.delete_cached_key().await?;
        self.store.delete_salt().await?;
        info!("All key material purged");
        Ok(())
    }
}
