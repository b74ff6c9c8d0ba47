//! Durable session metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata sidecar stored next to each payload record.
///
/// Kept as a separate plain-JSON file so listings and expiry scans can read
/// every session's bookkeeping without materializing payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Session identifier (UUID, immutable once created).
    pub session_id: String,

    /// When the session was first saved.
    pub created_at: DateTime<Utc>,

    /// When the session was last successfully loaded or saved.
    pub last_accessed: DateTime<Utc>,

    /// Owning client (caller network address), absent for anonymous saves.
    pub client_id: Option<String>,
}

impl SessionMetadata {
    /// Create metadata for a freshly saved session.
    pub fn new(session_id: impl Into<String>, client_id: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            created_at: now,
            last_accessed: now,
            client_id: client_id.map(String::from),
        }
    }

    /// Refresh the last-access stamp.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_accessed = now;
    }

    /// Whether the session has been idle longer than `ttl` as of `now`.
    pub fn is_expired(&self, ttl: chrono::Duration, now: DateTime<Utc>) -> bool {
        now - self.last_accessed > ttl
    }
}
