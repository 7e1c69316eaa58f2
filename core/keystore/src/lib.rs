//! Secret persistence boundary for Veildrive.
//!
//! The encryption core never persists anything itself. The surrounding
//! application stores exactly two opaque blobs on its behalf: the account
//! salt and the cached exported master key. This crate defines that
//! boundary and ships two implementations:
//! - `MemoryStore` for tests and ephemeral sessions
//! - `LocalStore` for hosts whose only persistence is text-valued files

pub mod local;
pub mod memory;
pub mod store;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use store::SecretStore;
