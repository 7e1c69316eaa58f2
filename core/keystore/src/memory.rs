//! In-memory secret store for testing.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::store::SecretStore;
use veildrive_common::Result;

/// In-memory secret store.
///
/// Useful for testing and ephemeral sessions. All data is stored in
/// memory and lost on drop.
#[derive(Default)]
pub struct MemoryStore {
    salt: RwLock<Option<Vec<u8>>>,
    cached_key: RwLock<Option<Vec<u8>>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load_salt(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.salt.read().unwrap().clone())
    }

    async fn store_salt(&self, salt: &[u8]) -> Result<()> {
        *self.salt.write().unwrap() = Some(salt.to_vec());
        Ok(())
    }

    async fn delete_salt(&self) -> Result<()> {
        *self.salt.write().unwrap() = None;
        Ok(())
    }

    async fn load_cached_key(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.cached_key.read().unwrap().clone())
    }

    async fn store_cached_key(&self, key: &[u8]) -> Result<()> {
        *self.cached_key.write().unwrap() = Some(key.to_vec());
        Ok(())
    }

    async fn delete_cached_key(&self) -> Result<()> {
        *self.cached_key.write().unwrap() = None;
        Ok(())
    }
}
