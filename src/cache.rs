//! Bounded in-memory cache of rendered search results

use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use tokio::sync::Mutex;

/// Digest of a `(term, max_chars)` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(term: &str, max_chars: usize) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(term.as_bytes());
        hasher.update(b"\x00");
        hasher.update(max_chars.to_le_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }
}

/// Least-recently-used cache keyed by [`CacheKey`].
///
/// Entries never expire; they live until evicted or the process exits.
#[derive(Debug)]
pub struct SearchCache {
    entries: Mutex<LruCache<CacheKey, String>>,
    capacity: NonZeroUsize,
}

impl SearchCache {
    /// A capacity of 0 is treated as 1
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity,
        }
    }

    /// Look up a value, marking it most recently used
    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Store a value, evicting the least recently used entry when full
    pub async fn put(&self, key: CacheKey, value: String) {
        self.entries.lock().await.put(key, value);
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_deterministic() {
        assert_eq!(CacheKey::new("OrderSend", 4000), CacheKey::new("OrderSend", 4000));
        assert_ne!(CacheKey::new("OrderSend", 4000), CacheKey::new("OrderSend", 2000));
        assert_ne!(CacheKey::new("OrderSend", 4000), CacheKey::new("iMA", 4000));
    }

    #[tokio::test]
    async fn test_cache_insert_and_get() {
        let cache = SearchCache::new(10);
        cache
            .put(CacheKey::new("iMA", 4000), "SOURCE: x\n\nbody".to_string())
            .await;

        assert_eq!(
            cache.get(&CacheKey::new("iMA", 4000)).await.as_deref(),
            Some("SOURCE: x\n\nbody")
        );
        assert_eq!(cache.get(&CacheKey::new("iMA", 10)).await, None);
    }

    #[tokio::test]
    async fn test_empty_value_is_a_hit() {
        let cache = SearchCache::new(2);
        cache.put(CacheKey::new("empty", 1), String::new()).await;
        assert_eq!(cache.get(&CacheKey::new("empty", 1)).await, Some(String::new()));
    }

    #[tokio::test]
    async fn test_evicts_least_recently_used() {
        let cache = SearchCache::new(2);
        cache.put(CacheKey::new("one", 1), "one".to_string()).await;
        cache.put(CacheKey::new("two", 1), "two".to_string()).await;

        // Touch "one" so "two" becomes the eviction candidate
        assert!(cache.get(&CacheKey::new("one", 1)).await.is_some());
        cache.put(CacheKey::new("three", 1), "three".to_string()).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get(&CacheKey::new("one", 1)).await.is_some());
        assert!(cache.get(&CacheKey::new("two", 1)).await.is_none());
        assert!(cache.get(&CacheKey::new("three", 1)).await.is_some());
    }

    #[tokio::test]
    async fn test_capacity_never_exceeded() {
        let cache = SearchCache::new(50);
        for i in 0..120 {
            cache.put(CacheKey::new(&format!("term-{i}"), 4000), i.to_string()).await;
            assert!(cache.len().await <= 50);
        }
        assert_eq!(cache.len().await, 50);
        assert_eq!(cache.capacity(), 50);
        assert!(cache.get(&CacheKey::new("term-0", 4000)).await.is_none());
        assert!(cache.get(&CacheKey::new("term-119", 4000)).await.is_some());
    }

    #[tokio::test]
    async fn test_update_existing() {
        let cache = SearchCache::new(10);
        cache.put(CacheKey::new("k", 1), "old".to_string()).await;
        cache.put(CacheKey::new("k", 1), "new".to_string()).await;

        assert_eq!(cache.get(&CacheKey::new("k", 1)).await.as_deref(), Some("new"));
        assert_eq!(cache.len().await, 1);
        assert!(!cache.is_empty().await);
    }
}
