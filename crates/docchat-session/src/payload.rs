//! Session payloads: what the store persists on behalf of collaborators.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::response::{QueryResponse, ResponseCache};

/// A value the session store can persist and hand back.
///
/// The store treats payloads as opaque serializable blobs with exactly one
/// probe: [`is_ready`](SessionPayload::is_ready). A record that reads back
/// successfully but is not ready is reported as missing, so callers
/// uniformly re-provision instead of handling a usable-but-broken session.
pub trait SessionPayload:
    Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Whether the payload can actually serve queries.
    fn is_ready(&self) -> bool;
}

/// Processing state for one indexed document.
///
/// The index blob is produced by the external ingestion/indexing
/// collaborator and is opaque here. The response cache rides along
/// in-process only: it is rebuilt empty whenever the session is loaded
/// from the durable tier, and clones share it, so a session promoted into
/// the hot cache and the caller's copy see the same entries.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DocumentSession {
    index: Option<Vec<u8>>,

    #[serde(skip)]
    responses: ResponseCache,
}

impl DocumentSession {
    /// A session wrapping an index produced by the ingestion collaborator.
    pub fn new(index: Vec<u8>) -> Self {
        Self {
            index: Some(index),
            responses: ResponseCache::new(),
        }
    }

    /// A session whose indexing never completed. Not usable for queries.
    pub fn unindexed() -> Self {
        Self {
            index: None,
            responses: ResponseCache::new(),
        }
    }

    /// The opaque index blob, when present.
    pub fn index(&self) -> Option<&[u8]> {
        self.index.as_deref()
    }

    /// Look up a previously answered query.
    pub fn cached_response(&self, query: &str) -> Option<QueryResponse> {
        self.responses.get(query)
    }

    /// Record an answered query for reuse.
    pub fn cache_response(&self, query: &str, response: QueryResponse) {
        self.responses.put(query, response);
    }

    /// The embedded response cache.
    pub fn responses(&self) -> &ResponseCache {
        &self.responses
    }
}

impl SessionPayload for DocumentSession {
    fn is_ready(&self) -> bool {
        self.index.is_some()
    }
}
