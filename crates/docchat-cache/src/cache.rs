//! Bounded in-memory cache with recency-LRU eviction and TTL support.

use std::sync::Arc;

use lru::LruCache;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::config::CacheConfig;
use crate::ttl::AccessTracker;

/// Inner state protected by the RwLock.
///
/// The LRU order and the access clock move together: every operation that
/// refreshes one refreshes the other, so the LRU tail is always the entry
/// with the oldest last-access time.
struct CacheInner<V> {
    lru: LruCache<String, V>,
    access: AccessTracker,
}

/// Hot tier of a two-tier session store.
///
/// - Bounded: inserting beyond capacity evicts the least recently
///   *accessed* entry, one at a time, until within bound.
/// - Expiring: entries idle past the TTL are reported as misses and can be
///   swept in bulk via [`evict_expired`](HotCache::evict_expired).
/// - A pure cache: eviction only forgets the in-memory copy. Durable state
///   is owned elsewhere and the cache can be repopulated from it.
///
/// Reads that refresh the access clock are mutations and take the write
/// lock, so a concurrent sweep can never evict an entry mid-touch.
pub struct HotCache<V> {
    inner: Arc<RwLock<CacheInner<V>>>,
    config: CacheConfig,
}

impl<V: Clone + Send + Sync + 'static> HotCache<V> {
    /// Create a new cache.
    pub fn new(config: CacheConfig) -> Self {
        let inner = CacheInner {
            lru: LruCache::unbounded(),
            access: AccessTracker::new(config.ttl),
        };

        Self {
            inner: Arc::new(RwLock::new(inner)),
            config,
        }
    }

    /// The cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Current number of cached entries.
    pub async fn len(&self) -> usize {
        self.inner.read().await.lru.len()
    }

    /// Whether the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.lru.is_empty()
    }

    /// Look up an entry, refreshing its access clock and LRU position.
    ///
    /// An entry idle past the TTL is dropped and reported as a miss.
    pub async fn get(&self, id: &str) -> Option<V> {
        let mut inner = self.inner.write().await;

        if inner.access.is_expired(id) {
            if inner.lru.pop(id).is_some() {
                debug!(session_id = %id, "entry idle past TTL, dropping from hot cache");
            }
            inner.access.remove(id);
            return None;
        }

        let value = inner.lru.get(id).cloned();
        if value.is_some() {
            trace!(session_id = %id, "hot cache hit");
            inner.access.touch(id);
        }
        value
    }

    /// Insert or refresh an entry, then evict until within capacity.
    ///
    /// Returns the ids evicted to make room (empty on the common path).
    pub async fn insert(&self, id: &str, value: V) -> Vec<String> {
        let capacity = self.config.capacity.max(1);
        let mut inner = self.inner.write().await;

        inner.lru.put(id.to_string(), value);
        inner.access.touch(id);

        let mut evicted = Vec::new();
        while inner.lru.len() > capacity {
            // The tail is the least recently accessed entry; the one just
            // inserted sits at the head and is never popped here.
            let Some((old_id, _)) = inner.lru.pop_lru() else {
                break;
            };
            inner.access.remove(&old_id);
            debug!(session_id = %old_id, "evicting least recently used entry");
            evicted.push(old_id);
        }

        trace!(
            session_id = %id,
            cache_size = inner.lru.len(),
            "entry inserted into hot cache"
        );

        evicted
    }

    /// Remove an entry, returning its value if it was present.
    pub async fn remove(&self, id: &str) -> Option<V> {
        let mut inner = self.inner.write().await;
        inner.access.remove(id);
        inner.lru.pop(id)
    }

    /// Drop every entry idle past the TTL and return the removed ids.
    pub async fn evict_expired(&self) -> Vec<String> {
        let mut inner = self.inner.write().await;

        let mut removed = Vec::new();
        for id in inner.access.drain_expired() {
            if inner.lru.pop(&id).is_some() {
                removed.push(id);
            }
        }

        if !removed.is_empty() {
            debug!(count = removed.len(), "swept expired entries from hot cache");
        }

        removed
    }

    /// Whether a live (non-expired) entry exists, without touching it.
    pub async fn contains(&self, id: &str) -> bool {
        let inner = self.inner.read().await;
        inner.lru.contains(id) && !inner.access.is_expired(id)
    }

    /// Cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.read().await;
        CacheStats {
            size: inner.lru.len(),
            capacity: self.config.capacity,
            tracked: inner.access.len(),
        }
    }
}

impl<V> Clone for HotCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            config: self.config.clone(),
        }
    }
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Current number of cached entries.
    pub size: usize,

    /// Configured capacity.
    pub capacity: usize,

    /// Number of keys with a recorded access time.
    pub tracked: usize,
}
