//! Key-value persistence contract used by the identity database.
//!
//! Keys are UTF-8 strings, values are opaque bytes. Two backends are provided:
//! [`MemoryStore`] for tests and ephemeral runs, [`RedbStore`] for durable
//! on-disk state.
//!
//! Every mutating call is atomic on its own. [`KVStore::replace_prefix`]
//! swaps a whole namespace in one step, which is how full snapshots are
//! written without ever exposing a half-written state.

pub mod memory;
pub mod redb;

use std::fmt;
use thiserror::Error;

/// Errors that can occur in KV store operations.
#[derive(Error, Debug)]
pub enum KVError {
    #[error("kv: cannot open store: {0}")]
    Open(String),

    #[error("kv: storage error: {0}")]
    Storage(String),

    #[error("kv: lock poisoned")]
    Poisoned,
}

/// Result type for KV operations.
pub type KVResult<T> = Result<T, KVError>;

/// Key-value store trait.
pub trait KVStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &str) -> KVResult<Option<Vec<u8>>>;

    /// Set a key-value pair.
    fn set(&self, key: &str, value: &[u8]) -> KVResult<()>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> KVResult<()>;

    /// Return all pairs whose key starts with `prefix`, sorted by key.
    fn scan(&self, prefix: &str) -> KVResult<Vec<(String, Vec<u8>)>>;

    /// Remove every key under `prefix` and write `entries` in one atomic step.
    ///
    /// Readers observe either the old namespace or the new one, never a mix.
    /// Entries outside `prefix` are written too, but callers should not rely
    /// on that.
    fn replace_prefix(&self, prefix: &str, entries: &[(&str, &[u8])]) -> KVResult<()>;
}

impl fmt::Debug for dyn KVStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KVStore {{ ... }}")
    }
}

pub use self::memory::MemoryStore;
pub use self::redb::RedbStore;
