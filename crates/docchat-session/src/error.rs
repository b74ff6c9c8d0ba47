//! Error types for session store operations.

/// Error type for session store operations.
///
/// `NotFound` is always recoverable and signals "provision a new session"
/// to the caller. I/O failures are surfaced as failed operations, never
/// silently mapped to `NotFound`; the one sanctioned downgrade is a record
/// that reads back but fails validity checks, which callers are meant to
/// treat exactly like a missing session.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Session was absent from every tier.
    #[error("session not found: {0}")]
    NotFound(String),

    /// Durable tier read or write failed.
    #[error("session storage i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// Payload or metadata could not be encoded for the durable tier.
    #[error("session record encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// A client id is required by configuration but was not supplied.
    #[error("client id required for session registration")]
    ClientRequired,
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
