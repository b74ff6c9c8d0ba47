//! Session store facade: the single surface collaborators talk to.
//!
//! Orchestrates three structures with distinct policies:
//! - the hot cache (access-recency LRU over in-memory payloads),
//! - the quota tracker (FIFO per-client session lists),
//! - the durable record store (payload + metadata files, ground truth).
//!
//! The durable tier always wins when the tiers disagree: the hot cache is
//! repopulated from it and never deletes from it. Cross-tier consistency
//! comes from running every mutation through the same ordered sequence of
//! sub-operations rather than from any cross-tier transaction.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use docchat_cache::{CacheConfig, CacheStats, HotCache};
use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::disk::DiskRecordStore;
use crate::error::{Result, StoreError};
use crate::payload::SessionPayload;
use crate::quota::QuotaTracker;
use crate::record::SessionMetadata;

/// Mint a fresh session identifier.
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Outcome of one expiry sweep.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SweepReport {
    /// Entries dropped from the hot cache for idling past the TTL.
    pub hot_evicted: usize,

    /// Durable records removed (cascading through every tier).
    pub records_removed: usize,

    /// Records that looked expired but could not be removed.
    pub failures: usize,
}

struct ListingMemo {
    taken_at: Instant,
    sessions: Vec<SessionMetadata>,
}

/// Durable, quota-enforced session store with a hot in-memory tier.
///
/// Cheap to clone: clones share every tier. Create one per process at
/// startup and hand clones to request handlers and the reaper; there is no
/// ambient global state.
pub struct SessionStore<P: SessionPayload> {
    hot: HotCache<P>,
    quota: Arc<Mutex<QuotaTracker>>,
    disk: Arc<DiskRecordStore>,
    /// Serializes durable writes. One coarse gate: no two writers ever
    /// race on the same record's files.
    io_gate: Arc<tokio::sync::Mutex<()>>,
    listing: Arc<Mutex<Option<ListingMemo>>>,
    config: StoreConfig,
}

impl<P: SessionPayload> Clone for SessionStore<P> {
    fn clone(&self) -> Self {
        Self {
            hot: self.hot.clone(),
            quota: Arc::clone(&self.quota),
            disk: Arc::clone(&self.disk),
            io_gate: Arc::clone(&self.io_gate),
            listing: Arc::clone(&self.listing),
            config: self.config.clone(),
        }
    }
}

impl<P: SessionPayload> SessionStore<P> {
    /// Open a store, creating the data directory if needed.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let disk = DiskRecordStore::open(&config.data_dir)?;
        let hot = HotCache::new(
            CacheConfig::new()
                .with_capacity(config.hot_capacity)
                .with_ttl(config.ttl),
        );
        let quota = QuotaTracker::new(config.max_sessions_per_client);

        info!(
            data_dir = %disk.data_dir().display(),
            hot_capacity = config.hot_capacity,
            ttl_secs = config.ttl.as_secs(),
            "session store opened"
        );

        Ok(Self {
            hot,
            quota: Arc::new(Mutex::new(quota)),
            disk: Arc::new(disk),
            io_gate: Arc::new(tokio::sync::Mutex::new(())),
            listing: Arc::new(Mutex::new(None)),
            config,
        })
    }

    /// The store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Persist a session.
    ///
    /// Sequence: quota registration (cascading a FIFO eviction of the
    /// client's oldest session when over the cap), then the durable write,
    /// then best-effort hot cache population. The save only succeeds once
    /// the durable write has completed; on failure a fresh quota
    /// registration is rolled back so a failed save consumes nothing.
    pub async fn save(
        &self,
        session_id: &str,
        payload: P,
        client_id: Option<&str>,
    ) -> Result<()> {
        if self.config.require_client_id && client_id.is_none() {
            return Err(StoreError::ClientRequired);
        }

        let mut freshly_registered = false;
        if let Some(client) = client_id {
            let evicted = {
                let mut quota = self.quota.lock();
                freshly_registered = !quota
                    .sessions_for(client)
                    .iter()
                    .any(|s| s == session_id);
                quota.register(client, session_id)
            };

            if let Some(old) = evicted {
                info!(
                    client_id = %client,
                    evicted = %old,
                    "client over session quota, evicting oldest session"
                );
                match self.delete(&old).await {
                    Ok(()) | Err(StoreError::NotFound(_)) => {}
                    Err(e) => {
                        warn!(session_id = %old, error = %e, "quota eviction cleanup failed");
                    }
                }
            }
        }

        let written = self.write_durable(session_id, &payload, client_id).await;
        if let Err(e) = written {
            if freshly_registered {
                if let Some(client) = client_id {
                    self.quota.lock().unregister(client, session_id);
                }
            }
            return Err(e);
        }

        self.hot.insert(session_id, payload).await;
        debug!(session_id = %session_id, "session saved");
        Ok(())
    }

    async fn write_durable(
        &self,
        session_id: &str,
        payload: &P,
        client_id: Option<&str>,
    ) -> Result<()> {
        let bytes = serde_json::to_vec(payload)?;
        let meta = SessionMetadata::new(session_id, client_id);

        let _gate = self.io_gate.lock().await;
        self.disk.write_record(&meta, &bytes)
    }

    /// Fetch a session's payload, hot tier first.
    ///
    /// Every successful load refreshes both the in-memory access clock and
    /// the durable `last_accessed` stamp, so an actively served session can
    /// never look idle to the reaper. A record that reads back but cannot
    /// be decoded, or decodes into an unusable payload, is reported as
    /// `NotFound` so the caller re-provisions.
    pub async fn load(&self, session_id: &str) -> Result<P> {
        if let Some(payload) = self.hot.get(session_id).await {
            debug!(session_id = %session_id, "session served from hot cache");
            self.touch_durable(session_id).await;
            return Ok(payload);
        }

        let payload = {
            let _gate = self.io_gate.lock().await;

            let Some(bytes) = self.disk.read_payload(session_id)? else {
                return Err(StoreError::NotFound(session_id.to_string()));
            };

            let payload: P = match serde_json::from_slice(&bytes) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(
                        session_id = %session_id,
                        error = %e,
                        "stored payload failed to decode, treating as missing"
                    );
                    return Err(StoreError::NotFound(session_id.to_string()));
                }
            };

            if !payload.is_ready() {
                warn!(session_id = %session_id, "stored payload has no usable index");
                return Err(StoreError::NotFound(session_id.to_string()));
            }

            if let Err(e) = self.disk.touch(session_id, Utc::now()) {
                warn!(session_id = %session_id, error = %e, "failed to refresh access stamp");
            }
            payload
        };

        self.hot.insert(session_id, payload.clone()).await;
        debug!(session_id = %session_id, "session promoted from durable store");
        Ok(payload)
    }

    async fn touch_durable(&self, session_id: &str) {
        let _gate = self.io_gate.lock().await;
        match self.disk.touch(session_id, Utc::now()) {
            Ok(true) => {}
            Ok(false) => {
                debug!(session_id = %session_id, "no metadata sidecar to refresh");
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "failed to refresh access stamp");
            }
        }
    }

    /// Remove a session from every tier.
    ///
    /// Idempotent: removing an id no tier holds reports `NotFound` and has
    /// no side effects.
    pub async fn delete(&self, session_id: &str) -> Result<()> {
        let removed_hot = self.hot.remove(session_id).await.is_some();

        let (owner, removed_disk) = {
            let _gate = self.io_gate.lock().await;
            let owner = self
                .disk
                .read_metadata(session_id)?
                .and_then(|meta| meta.client_id);
            let removed = self.disk.delete(session_id)?;
            (owner, removed)
        };

        {
            let mut quota = self.quota.lock();
            match owner {
                Some(client) => quota.unregister(&client, session_id),
                // Owner unknown (anonymous session or unreadable sidecar):
                // scrub the id from every client list.
                None => quota.remove_session(session_id),
            }
        }

        if removed_hot || removed_disk {
            debug!(session_id = %session_id, "session deleted");
            Ok(())
        } else {
            Err(StoreError::NotFound(session_id.to_string()))
        }
    }

    /// Enumerate session metadata for diagnostics.
    ///
    /// Never mutates access times or triggers eviction. Results are reused
    /// for `listing_ttl` before re-reading the directory.
    pub async fn list_sessions(&self) -> Result<Vec<SessionMetadata>> {
        if !self.config.listing_ttl.is_zero() {
            let memo = self.listing.lock();
            if let Some(memo) = memo.as_ref() {
                if memo.taken_at.elapsed() < self.config.listing_ttl {
                    return Ok(memo.sessions.clone());
                }
            }
        }

        let sessions = self.disk.list_metadata()?;
        *self.listing.lock() = Some(ListingMemo {
            taken_at: Instant::now(),
            sessions: sessions.clone(),
        });
        Ok(sessions)
    }

    /// Session ids currently counted against a client's quota, oldest
    /// first.
    pub fn sessions_for_client(&self, client_id: &str) -> Vec<String> {
        self.quota.lock().sessions_for(client_id)
    }

    /// Hot tier statistics.
    pub async fn cache_stats(&self) -> CacheStats {
        self.hot.stats().await
    }

    /// Run one expiry sweep over both tiers.
    ///
    /// Pass one drops idle entries from the hot cache. Pass two enumerates
    /// durable metadata and deletes every record idle past the TTL through
    /// the full delete path, cascading to the quota tracker and hot cache.
    /// Per-record failures are logged and skipped; they never abort the
    /// sweep for the remaining records.
    pub async fn sweep_expired(&self) -> SweepReport {
        let mut report = SweepReport::default();

        report.hot_evicted = self.hot.evict_expired().await.len();

        let sessions = {
            let _gate = self.io_gate.lock().await;
            match self.disk.list_metadata() {
                Ok(sessions) => sessions,
                Err(e) => {
                    warn!(error = %e, "expiry sweep could not enumerate records");
                    return report;
                }
            }
        };

        let Ok(ttl) = chrono::Duration::from_std(self.config.ttl) else {
            return report;
        };
        let now = Utc::now();

        for meta in sessions {
            if !meta.is_expired(ttl, now) {
                continue;
            }
            match self.delete(&meta.session_id).await {
                Ok(()) => {
                    info!(
                        session_id = %meta.session_id,
                        last_accessed = %meta.last_accessed,
                        "expired session removed"
                    );
                    report.records_removed += 1;
                }
                // Raced with an explicit delete; nothing left to remove.
                Err(StoreError::NotFound(_)) => {}
                Err(e) => {
                    warn!(session_id = %meta.session_id, error = %e, "failed to remove expired session");
                    report.failures += 1;
                }
            }
        }

        if report.records_removed > 0 || report.hot_evicted > 0 {
            info!(
                hot_evicted = report.hot_evicted,
                records_removed = report.records_removed,
                failures = report.failures,
                "expiry sweep completed"
            );
        }

        report
    }
}
