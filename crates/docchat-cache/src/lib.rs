//! In-memory session tier with recency-LRU eviction and TTL tracking.
//!
//! This crate provides the hot tier of a two-tier session store:
//! - a bounded cache that evicts the least recently *accessed* entry
//! - an access clock used for TTL-based expiry
//!
//! The hot tier is a pure cache: it holds no durable state, eviction never
//! deletes anything outside it, and it can be rebuilt from the durable tier
//! at any time.
//!
//! # Example
//!
//! ```rust,ignore
//! use docchat_cache::{CacheConfig, HotCache};
//!
//! let config = CacheConfig::new()
//!     .with_capacity(50)
//!     .with_ttl(Duration::from_secs(24 * 3600));
//!
//! let cache: HotCache<Vec<u8>> = HotCache::new(config);
//! ```

mod cache;
mod config;
mod ttl;

pub use cache::{CacheStats, HotCache};
pub use config::CacheConfig;
pub use ttl::AccessTracker;
