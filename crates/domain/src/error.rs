use thiserror::Error;

/// Errors surfaced by the command pipeline.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The command requires an existing aggregate but hydration produced no
    /// events, or the aggregate is soft-deleted.
    #[error("aggregate not found")]
    NotFound,

    /// The command requires a fresh aggregate but events already exist.
    #[error("aggregate already exists")]
    AlreadyExists,

    /// The issuing principal is not allowed to perform this command.
    #[error("forbidden")]
    Forbidden,

    /// Structural or field validation failed before any storage access.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// The event store rejected the load or append.
    #[error("event store error: {0}")]
    EventStore(#[from] event_store::EventStoreError),

    /// The events were durably stored but the live publish failed. The
    /// outbox relay will still deliver them.
    #[error("events stored but live publish failed: {0}")]
    Publish(#[from] stream::StreamError),
}
