//! Secret store trait definition.

use async_trait::async_trait;

use veildrive_common::Result;

/// Storage boundary for the two secrets the core cannot keep in memory
/// across restarts.
///
/// Both blobs are opaque to the store: it must return exactly the bytes
/// it was given and impose no semantics of its own. Deletes are
/// idempotent; deleting an absent blob is not an error.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Get the store name (e.g., "memory", "local").
    fn name(&self) -> &str;

    /// Load the account salt, if one was ever stored.
    async fn load_salt(&self) -> Result<Option<Vec<u8>>>;

    /// Persist the account salt.
    ///
    /// # Postconditions
    /// - A later `load_salt` returns exactly these bytes
    async fn store_salt(&self, salt: &[u8]) -> Result<()>;

    /// Remove the account salt.
    async fn delete_salt(&self) -> Result<()>;

    /// Load the cached exported master key, if present.
    async fn load_cached_key(&self) -> Result<Option<Vec<u8>>>;

    /// Cache the exported master key.
    ///
    /// # Security
    /// Implementations hold the bytes that decrypt every file; only use a
    /// store as trusted as the session itself.
    async fn store_cached_key(&self, key: &[u8]) -> Result<()>;

    /// Remove the cached exported master key.
    async fn delete_cached_key(&self) -> Result<()>;
}
