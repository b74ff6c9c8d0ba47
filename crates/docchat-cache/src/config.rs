//! Configuration for the hot cache.

use std::time::Duration;

/// Default number of sessions held in memory before eviction kicks in.
pub const DEFAULT_CAPACITY: usize = 50;

/// Default TTL (none; entries only leave via LRU eviction or removal).
pub const DEFAULT_TTL: Option<Duration> = None;

/// Configuration for the hot cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries held before LRU eviction.
    pub capacity: usize,

    /// Optional time-to-live measured from the last access.
    /// Entries idle longer than this are treated as absent.
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl: DEFAULT_TTL,
        }
    }
}

impl CacheConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of entries.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the idle TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Disable time-based expiry.
    pub fn without_ttl(mut self) -> Self {
        self.ttl = None;
        self
    }
}
