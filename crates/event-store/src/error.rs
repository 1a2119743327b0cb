use thiserror::Error;

use crate::{AggregateId, Version};

/// Errors that can occur when interacting with the event store.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The aggregate's stored version advanced since it was hydrated.
    /// The append was rejected; no events were written.
    #[error(
        "concurrency conflict for aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        aggregate_id: AggregateId,
        expected: Version,
        actual: Version,
    },

    /// A stored event carries a type tag no factory was registered for.
    /// This means the running binary is missing an event type it must know
    /// about, so it is always treated as fatal rather than recoverable.
    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    /// The event batch handed to `append` was malformed.
    #[error("invalid event batch: {0}")]
    InvalidBatch(String),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;
