//! Configuration for the session store.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default number of sessions held in the hot cache.
pub const DEFAULT_HOT_CAPACITY: usize = 50;

/// Default idle lifetime of a session (24 hours).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 3600);

/// Default interval between reaper scans (one hour).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Default cap on live sessions per client.
pub const DEFAULT_MAX_SESSIONS_PER_CLIENT: usize = 5;

/// Default window for which a session listing is reused.
pub const DEFAULT_LISTING_TTL: Duration = Duration::from_secs(60);

/// Configuration for [`SessionStore`](crate::SessionStore).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding payload records and metadata sidecars.
    pub data_dir: PathBuf,

    /// Hot cache capacity.
    pub hot_capacity: usize,

    /// Idle lifetime after which a session is eligible for expiry.
    pub ttl: Duration,

    /// Interval between background reaper scans.
    pub sweep_interval: Duration,

    /// Maximum live sessions per client; the oldest is evicted on overflow.
    pub max_sessions_per_client: usize,

    /// How long a `list_sessions` result is reused before re-reading disk.
    pub listing_ttl: Duration,

    /// Refuse saves that carry no client id. Off by default: anonymous
    /// sessions are admitted and bypass quota tracking entirely.
    pub require_client_id: bool,
}

impl StoreConfig {
    /// Create a configuration rooted at the given data directory.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            hot_capacity: DEFAULT_HOT_CAPACITY,
            ttl: DEFAULT_SESSION_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            max_sessions_per_client: DEFAULT_MAX_SESSIONS_PER_CLIENT,
            listing_ttl: DEFAULT_LISTING_TTL,
            require_client_id: false,
        }
    }

    /// Set the hot cache capacity.
    pub fn with_hot_capacity(mut self, capacity: usize) -> Self {
        self.hot_capacity = capacity;
        self
    }

    /// Set the idle session lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the reaper scan interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Set the per-client session cap.
    pub fn with_max_sessions_per_client(mut self, max: usize) -> Self {
        self.max_sessions_per_client = max;
        self
    }

    /// Set the listing reuse window. Zero disables listing reuse.
    pub fn with_listing_ttl(mut self, ttl: Duration) -> Self {
        self.listing_ttl = ttl;
        self
    }

    /// Refuse saves without a client id.
    pub fn with_required_client_id(mut self) -> Self {
        self.require_client_id = true;
        self
    }
}
