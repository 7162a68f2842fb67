//! In-memory expiring cache for upstream responses
//!
//! Entries carry an optional deadline. Expiry is enforced lazily: the read
//! that observes a stale entry removes it, so there is no sweeper task.
//! There is no capacity bound and no LRU; only TTL evicts.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// TTL meaning "keep until deleted or overwritten"
pub const NO_EXPIRATION: Duration = Duration::ZERO;

struct CacheEntry<V> {
    value: V,
    /// `None` never expires
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now > deadline)
    }
}

/// Key/value store with per-entry TTL, guarded by a single lock
pub struct ExpiringCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> ExpiringCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Get a live value, removing it if it has expired
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;

        if entry.is_expired(Instant::now()) {
            entries.remove(key);
            return None;
        }

        Some(entry.value.clone())
    }

    /// Store a value, replacing any previous entry for the key.
    /// A zero `ttl` ([`NO_EXPIRATION`]) keeps the entry indefinitely.
    pub fn set(&self, key: &str, value: V, ttl: Duration) {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Instant::now().checked_add(ttl)
        };

        self.lock()
            .insert(key.to_string(), CacheEntry { value, expires_at });
    }

    pub fn delete(&self, key: &str) {
        self.lock().remove(key);
    }

    /// Number of stored entries, including expired ones not yet read
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Poisoning only means another thread panicked mid-insert; the map is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<V: Clone> Default for ExpiringCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    // Test 1: Set then get returns the value
    #[test]
    fn test_set_then_get() {
        let cache = ExpiringCache::new();
        cache.set("dollar_response", 42u32, Duration::from_secs(60));
        assert_eq!(cache.get("dollar_response"), Some(42));
    }

    // Test 2: Missing key
    #[test]
    fn test_get_missing_key() {
        let cache: ExpiringCache<u32> = ExpiringCache::new();
        assert_eq!(cache.get("nope"), None);
    }

    // Test 3: Expired entry is reported absent and removed on read
    #[test]
    fn test_expired_entry_removed_on_read() {
        let cache = ExpiringCache::new();
        cache.set("k", "v".to_string(), Duration::from_millis(20));
        assert_eq!(cache.get("k").as_deref(), Some("v"));

        thread::sleep(Duration::from_millis(60));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    // Test 4: Zero TTL never expires
    #[test]
    fn test_no_expiration_survives() {
        let cache = ExpiringCache::new();
        cache.set("k", 1u8, NO_EXPIRATION);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.get("k"), Some(1));
    }

    // Test 5: Delete removes the entry
    #[test]
    fn test_delete() {
        let cache = ExpiringCache::new();
        cache.set("k", 1u8, NO_EXPIRATION);
        cache.delete("k");
        assert_eq!(cache.get("k"), None);

        // Deleting an absent key is a no-op
        cache.delete("k");
    }

    // Test 6: Set overwrites value and TTL
    #[test]
    fn test_set_overwrites_previous_ttl() {
        let cache = ExpiringCache::new();
        cache.set("k", 1u8, Duration::from_millis(20));
        cache.set("k", 2u8, NO_EXPIRATION);

        thread::sleep(Duration::from_millis(60));

        assert_eq!(cache.get("k"), Some(2));
    }

    // Test 7: Keys are isolated
    #[test]
    fn test_keys_isolated() {
        let cache = ExpiringCache::new();
        cache.set("satoshi_ars_response", 1u8, NO_EXPIRATION);
        cache.set("satoshi_usd_response", 2u8, NO_EXPIRATION);
        assert_eq!(cache.get("satoshi_ars_response"), Some(1));
        assert_eq!(cache.get("satoshi_usd_response"), Some(2));
        assert_eq!(cache.len(), 2);
    }

    // Test 8: Concurrent writers and readers
    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(ExpiringCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let key = format!("key-{}", i);
                    for n in 0..100u32 {
                        cache.set(&key, n, NO_EXPIRATION);
                        assert!(cache.get(&key).is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 8);
        assert_eq!(cache.get("key-3"), Some(99));
    }
}
