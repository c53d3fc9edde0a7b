//! In-memory key-value store for tests and throwaway databases.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{KVError, KVResult, KVStore};

/// An in-memory key-value store backed by an ordered map.
///
/// Clones share the same underlying data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> KVResult<MutexGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.data.lock().map_err(|_| KVError::Poisoned)
    }
}

impl KVStore for MemoryStore {
    fn get(&self, key: &str) -> KVResult<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> KVResult<()> {
        self.lock()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> KVResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn scan(&self, prefix: &str) -> KVResult<Vec<(String, Vec<u8>)>> {
        let data = self.lock()?;
        Ok(data
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn replace_prefix(&self, prefix: &str, entries: &[(&str, &[u8])]) -> KVResult<()> {
        let mut data = self.lock()?;
        data.retain(|k, _| !k.starts_with(prefix));
        for (key, value) in entries {
            data.insert(key.to_string(), value.to_vec());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let store = MemoryStore::new();

        store.set("key1", b"value1").unwrap();
        assert_eq!(store.get("key1").unwrap(), Some(b"value1".to_vec()));
        assert_eq!(store.get("nonexistent").unwrap(), None);

        store.delete("key1").unwrap();
        assert_eq!(store.get("key1").unwrap(), None);
        store.delete("key1").unwrap();
    }

    #[test]
    fn test_scan_is_sorted_and_bounded() {
        let store = MemoryStore::new();
        store.set("ns:id:2", b"2").unwrap();
        store.set("ns:id:1", b"1").unwrap();
        store.set("ns:meta", b"m").unwrap();
        store.set("other:id:3", b"3").unwrap();

        let results = store.scan("ns:id:").unwrap();
        let keys: Vec<&str> = results.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["ns:id:1", "ns:id:2"]);
    }

    #[test]
    fn test_replace_prefix_drops_stale_keys() {
        let store = MemoryStore::new();
        store.set("ns:a", b"old").unwrap();
        store.set("ns:b", b"old").unwrap();
        store.set("keep:c", b"keep").unwrap();

        store.replace_prefix("ns:", &[("ns:a", b"new")]).unwrap();

        assert_eq!(store.get("ns:a").unwrap(), Some(b"new".to_vec()));
        assert_eq!(store.get("ns:b").unwrap(), None);
        assert_eq!(store.get("keep:c").unwrap(), Some(b"keep".to_vec()));
    }

    #[test]
    fn test_clones_share_data() {
        let a = MemoryStore::new();
        let b = a.clone();
        a.set("k", b"v").unwrap();
        assert_eq!(b.get("k").unwrap(), Some(b"v".to_vec()));
    }
}
