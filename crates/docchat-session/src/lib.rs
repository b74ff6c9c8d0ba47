//! Durable session store for a document-chat service.
//!
//! This crate owns session lifecycle between requests:
//! - a durable record tier (one payload file + metadata sidecar per id)
//! - a hot in-memory tier with access-recency LRU eviction
//! - per-client quotas, FIFO-evicting the oldest session on overflow
//! - a background reaper expiring idle sessions from both tiers
//! - a per-session cache of answered queries
//!
//! Document parsing, indexing, and query execution belong to external
//! collaborators; payloads are opaque here apart from one liveness probe.
//!
//! # Example
//!
//! ```rust,ignore
//! use docchat_session::{DocumentSession, SessionStore, StoreConfig, reaper};
//!
//! let store = SessionStore::open(StoreConfig::new("data/sessions"))?;
//! let reaper = reaper::spawn(store.clone(), store.config().sweep_interval);
//!
//! let id = docchat_session::generate_session_id();
//! store.save(&id, DocumentSession::new(index_blob), Some(client_addr)).await?;
//! let session = store.load(&id).await?;
//!
//! reaper.shutdown().await;
//! ```

mod config;
mod disk;
mod error;
mod payload;
mod quota;
mod record;
pub mod reaper;
mod response;
mod store;

pub use config::{
    DEFAULT_HOT_CAPACITY, DEFAULT_LISTING_TTL, DEFAULT_MAX_SESSIONS_PER_CLIENT,
    DEFAULT_SESSION_TTL, DEFAULT_SWEEP_INTERVAL, StoreConfig,
};
pub use disk::DiskRecordStore;
pub use error::{Result, StoreError};
pub use payload::{DocumentSession, SessionPayload};
pub use quota::QuotaTracker;
pub use reaper::ReaperHandle;
pub use record::SessionMetadata;
pub use response::{DEFAULT_RESPONSE_CAPACITY, QueryResponse, ResponseCache};
pub use store::{SessionStore, SweepReport, generate_session_id};
