//! Error taxonomy for the comfort pipeline.
//!
//! `StoreError` covers the persistence boundary; `IngestError` is what the
//! ingestion pipeline surfaces to callers. Notification failures are not
//! errors at all: delivery is fire-and-forget and only logged.

use thiserror::Error;
use uuid::Uuid;

// ---

/// Failures at the storage boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A persisted row failed to decode into a domain record.
    #[error("corrupt record: {0}")]
    Decode(String),
}

/// Failures surfaced by the ingestion pipeline.
///
/// An `InvalidReading` or `RoomNotFound` reading was rejected before any
/// write; a `Persistence` failure means the whole reading is un-ingested and
/// safe to resubmit.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("room {0} not found")]
    RoomNotFound(Uuid),

    #[error("invalid reading: {0}")]
    InvalidReading(String),

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}
