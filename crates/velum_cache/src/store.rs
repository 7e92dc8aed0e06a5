//! The external key-value store interface consumed by the cache.
//!
//! The core only needs `get` and `put`-with-TTL; eviction, enumeration,
//! and deletion stay with the store. [`MemoryStore`] is a self-contained
//! implementation that honors TTLs, suitable for tests and single-process
//! deployments.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::CacheError;

/// Key-value store operations required by the fragment cache.
///
/// Keys are fragment fingerprints in hex form. Store failures propagate
/// to the caller unchanged; the cache performs no retries.
pub trait CacheStore {
    /// Looks up a stored fragment, returning `None` on a miss.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores a fragment under `key` for `ttl_secs` seconds.
    fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError>;
}

impl<T: CacheStore + ?Sized> CacheStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        (**self).put(key, value, ttl_secs)
    }
}

#[derive(Debug, Clone)]
struct StoreEntry {
    value: String,
    ttl_secs: u64,
    stored_at: Instant,
}

impl StoreEntry {
    fn is_expired(&self) -> bool {
        self.stored_at.elapsed() >= Duration::from_secs(self.ttl_secs)
    }
}

/// In-memory TTL-honoring store.
///
/// Expired entries are dropped lazily on lookup. The store also records
/// the TTL of the last put per key and a total put count, which lets
/// tests assert on store traffic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoreEntry>>,
    put_count: Mutex<u64>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the TTL recorded for `key` by the most recent put, if any.
    pub fn ttl_of(&self, key: &str) -> Option<u64> {
        self.entries.lock().unwrap().get(key).map(|e| e.ttl_secs)
    }

    /// Returns the total number of `put` calls served.
    pub fn put_count(&self) -> u64 {
        *self.put_count.lock().unwrap()
    }

    /// Returns the number of live (non-expired) entries.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| !e.is_expired())
            .count()
    }

    /// Returns `true` if the store holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries.lock().unwrap();
        if matches!(entries.get(key), Some(entry) if entry.is_expired()) {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        *self.put_count.lock().unwrap() += 1;
        self.entries.lock().unwrap().insert(
            key.to_string(),
            StoreEntry {
                value: value.to_string(),
                ttl_secs,
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }
}
