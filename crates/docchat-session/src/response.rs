//! Per-session cache of answered queries.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Default number of cached responses per session.
pub const DEFAULT_RESPONSE_CAPACITY: usize = 100;

/// A completed answer from the delegated query engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Answer text.
    pub response: String,

    /// References to the source passages the answer was built from.
    pub sources: Vec<String>,

    /// Whether the cited sources are code.
    pub is_code: bool,

    /// Highlighting language for code sources.
    pub language: String,

    /// How long the query took to answer, in seconds.
    pub response_time: f64,
}

impl QueryResponse {
    /// Create a plain-text response with no source references.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            sources: Vec::new(),
            is_code: false,
            language: "python".to_string(),
            response_time: 0.0,
        }
    }
}

/// Bounded map from normalized query text to a cached response.
///
/// Lives inside one session's processing unit and is never shared across
/// sessions. Queries differing only in case or surrounding whitespace hit
/// the same entry. Overflow evicts the least recently used entry; entries
/// never expire by time and misses are never cached. The lock guards map
/// access only; query execution happens entirely outside it.
///
/// Clones share the underlying map, so every handle to a session's
/// processing unit sees the same cache.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Arc<Mutex<LruCache<String, QueryResponse>>>,
}

impl ResponseCache {
    /// Create a cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_RESPONSE_CAPACITY)
    }

    /// Create a cache bounded to `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or_else(|| NonZeroUsize::new(1).unwrap());
        Self {
            inner: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Look up a cached response for a query.
    pub fn get(&self, query: &str) -> Option<QueryResponse> {
        self.inner.lock().get(&normalize(query)).cloned()
    }

    /// Cache a response, evicting the least recently used entry at
    /// capacity.
    pub fn put(&self, query: &str, response: QueryResponse) {
        self.inner.lock().put(normalize(query), response);
    }

    /// Number of cached responses.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("len", &self.len())
            .finish()
    }
}

/// Two queries that differ only in case or surrounding whitespace are the
/// same question.
fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}
