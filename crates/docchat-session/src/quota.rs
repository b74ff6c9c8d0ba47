//! Per-client session quotas.

use std::collections::HashMap;

/// Tracks which sessions each client owns and enforces the per-client cap.
///
/// Lists are kept in registration order (oldest first) and overflow evicts
/// from the front: FIFO by registration, deliberately distinct from the hot
/// cache's access-recency LRU. State is memory-only; a process restart
/// resets all quotas (known limitation, mirrored from the source service).
#[derive(Debug)]
pub struct QuotaTracker {
    owned: HashMap<String, Vec<String>>,
    max_per_client: usize,
}

impl QuotaTracker {
    /// Create a tracker with the given per-client cap.
    pub fn new(max_per_client: usize) -> Self {
        Self {
            owned: HashMap::new(),
            max_per_client: max_per_client.max(1),
        }
    }

    /// Register a session for a client.
    ///
    /// Admission never fails. When the client is at its cap, the oldest
    /// registered session is removed from the list and returned so the
    /// caller can cascade-delete it from the other tiers. Re-registering an
    /// already-tracked session keeps its position and evicts nothing.
    pub fn register(&mut self, client_id: &str, session_id: &str) -> Option<String> {
        let sessions = self.owned.entry(client_id.to_string()).or_default();

        if sessions.iter().any(|s| s == session_id) {
            return None;
        }

        let evicted = if sessions.len() >= self.max_per_client {
            Some(sessions.remove(0))
        } else {
            None
        };

        sessions.push(session_id.to_string());
        evicted
    }

    /// Remove a session from a client's list, preserving the order of the
    /// remainder. No-op when the pair is untracked.
    pub fn unregister(&mut self, client_id: &str, session_id: &str) {
        if let Some(sessions) = self.owned.get_mut(client_id) {
            sessions.retain(|s| s != session_id);
            if sessions.is_empty() {
                self.owned.remove(client_id);
            }
        }
    }

    /// Remove a session regardless of owner.
    ///
    /// Used when the record that names the owner is gone or unreadable.
    pub fn remove_session(&mut self, session_id: &str) {
        self.owned
            .values_mut()
            .for_each(|sessions| sessions.retain(|s| s != session_id));
        self.owned.retain(|_, sessions| !sessions.is_empty());
    }

    /// Sessions owned by a client, oldest first.
    pub fn sessions_for(&self, client_id: &str) -> Vec<String> {
        self.owned.get(client_id).cloned().unwrap_or_default()
    }

    /// Number of clients with at least one tracked session.
    pub fn client_count(&self) -> usize {
        self.owned.len()
    }
}
