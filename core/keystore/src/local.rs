//! Filesystem-backed secret store.
//!
//! Stores both secrets as base64 text files in a single directory, for
//! hosts whose settings storage only takes text values. The base64 codec
//! keeps the on-disk form printable and exactly round-trippable.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::store::SecretStore;
use veildrive_common::{Error, Result};
use veildrive_crypto::encoding;

/// File holding the base64 account salt.
const SALT_FILENAME: &str = "key.salt";

/// File holding the base64 cached master key.
const KEY_FILENAME: &str = "master.key";

/// Filesystem secret store.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a new local store rooted at the given directory.
    ///
    /// # Postconditions
    /// - Root directory is created if it doesn't exist
    ///
    /// # Errors
    /// - Invalid path
    /// - Permission denied
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        // Create root if it doesn't exist (sync for constructor)
        if !root.exists() {
            std::fs::create_dir_all(&root)?;
        }

        Ok(Self { root })
    }

    async fn read_blob(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        let path = self.root.join(filename);
        if !path.exists() {
            return Ok(None);
        }

        let text = fs::read_to_string(&path).await?;
        let bytes = encoding::decode(text.trim())
            .map_err(|_| Error::Keystore(format!("Corrupt blob in {}", filename)))?;

        Ok(Some(bytes))
    }

    async fn write_blob(&self, filename: &str, bytes: &[u8]) -> Result<()> {
        let path = self.root.join(filename);
        fs::write(&path, encoding::encode(bytes)).await?;
        Ok(())
    }

    async fn delete_blob(&self, filename: &str) -> Result<()> {
        let path = self.root.join(filename);
        if path.exists() {
            fs::remove_file(&path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SecretStore for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn load_salt(&self) -> Result<Option<Vec<u8>>> {
        self.read_blob(SALT_FILENAME).await
    }

    async fn store_salt(&self, salt: &[u8]) -> Result<()> {
        self.write_blob(SALT_FILENAME, salt).await
    }

    async fn delete_salt(&self) -> Result<()> {
        self.delete_blob(SALT_FILENAME).await
    }

    async fn load_cached_key(&self) -> Result<Option<Vec<u8>>> {
        self.read_blob(KEY_FILENAME).await
    }

    async fn store_cached_key(&self, key: &[u8]) -> Result<()> {
        self.write_blob(KEY_FILENAME, key).await
    }

    async fn delete_cached_key(&self) -> Result<()> {
        self.delete_blob(KEY_FILENAME).await
    }
}
