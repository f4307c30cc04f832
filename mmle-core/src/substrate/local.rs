//! LocalStore - Capacity-Bound Key-Value Substrate
//!
//! TigerStyle: explicit byte bounds, quota enforced on every write.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::constants::LOCAL_STORE_CAPACITY_BYTES_DEFAULT;
use crate::storage::{StorageError, StorageResult};

/// A synchronous key-value substrate with get/set/remove/enumerate
/// semantics.
///
/// Writes may fail (quota, access denied); everything else is
/// infallible. Key enumeration carries no ordering guarantee.
pub trait LocalStore: Send + Sync {
    /// Write a value under a key, replacing any existing value.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Read the value stored under a key.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Delete a key. Removing an absent key is not an error.
    fn remove_item(&self, key: &str);

    /// All substrate keys, in substrate-defined order.
    fn keys(&self) -> Vec<String>;
}

// =============================================================================
// MemoryLocalStore
// =============================================================================

/// In-memory local store with a byte capacity.
///
/// A write that would push total usage (keys + values) over capacity
/// fails with `QuotaExceeded` and leaves the store unchanged. A store
/// built `with_capacity(0)` refuses every write, which is how tests
/// exercise the probe-fallback path.
#[derive(Debug)]
pub struct MemoryLocalStore {
    entries: RwLock<HashMap<String, String>>,
    capacity_bytes: usize,
}

impl MemoryLocalStore {
    /// Create a store with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(LOCAL_STORE_CAPACITY_BYTES_DEFAULT)
    }

    /// Create a store with an explicit byte capacity.
    #[must_use]
    pub fn with_capacity(capacity_bytes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity_bytes,
        }
    }

    /// Total bytes currently used by keys and values.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        let entries = self.entries.read().expect("local store lock poisoned");
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl Default for MemoryLocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStore for MemoryLocalStore {
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().expect("local store lock poisoned");

        let replaced_bytes = entries
            .get(key)
            .map_or(0, |existing| key.len() + existing.len());
        let used: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
        let after = used - replaced_bytes + key.len() + value.len();

        if after > self.capacity_bytes {
            return Err(StorageError::quota(format!(
                "write of {} bytes exceeds capacity {} (used {})",
                key.len() + value.len(),
                self.capacity_bytes,
                used
            )));
        }

        entries.insert(key.to_string(), value.to_string());

        // Postcondition
        assert!(
            entries.iter().map(|(k, v)| k.len() + v.len()).sum::<usize>()
                <= self.capacity_bytes,
            "usage must stay within capacity"
        );

        Ok(())
    }

    fn get_item(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().expect("local store lock poisoned");
        entries.get(key).cloned()
    }

    fn remove_item(&self, key: &str) {
        let mut entries = self.entries.write().expect("local store lock poisoned");
        entries.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        let entries = self.entries.read().expect("local store lock poisoned");
        entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryLocalStore::new();

        store.set_item("a", "1").unwrap();
        assert_eq!(store.get_item("a"), Some("1".to_string()));

        store.remove_item("a");
        assert_eq!(store.get_item("a"), None);
    }

    #[test]
    fn test_overwrite_replaces() {
        let store = MemoryLocalStore::new();

        store.set_item("a", "old").unwrap();
        store.set_item("a", "new").unwrap();

        assert_eq!(store.get_item("a"), Some("new".to_string()));
        assert_eq!(store.keys().len(), 1);
    }

    #[test]
    fn test_remove_absent_is_not_an_error() {
        let store = MemoryLocalStore::new();
        store.remove_item("never-written");
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_quota_enforced() {
        let store = MemoryLocalStore::with_capacity(10);

        // 1 + 5 = 6 bytes, fits.
        store.set_item("a", "12345").unwrap();

        // 1 + 5 more would make 12 bytes, over.
        let result = store.set_item("b", "12345");
        assert!(matches!(result, Err(StorageError::QuotaExceeded(_))));

        // Failed write left the store unchanged.
        assert_eq!(store.get_item("b"), None);
        assert_eq!(store.used_bytes(), 6);
    }

    #[test]
    fn test_quota_accounts_for_replacement() {
        let store = MemoryLocalStore::with_capacity(10);

        store.set_item("k", "123456789").unwrap();
        // Replacing frees the old value first, so this still fits.
        store.set_item("k", "987654321").unwrap();

        assert_eq!(store.get_item("k"), Some("987654321".to_string()));
    }

    #[test]
    fn test_zero_capacity_refuses_everything() {
        let store = MemoryLocalStore::with_capacity(0);
        assert!(store.set_item("k", "").is_err());
    }

    #[test]
    fn test_keys_lists_all() {
        let store = MemoryLocalStore::new();
        store.set_item("a", "1").unwrap();
        store.set_item("b", "2").unwrap();

        let mut keys = store.keys();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
