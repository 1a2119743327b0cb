use thiserror::Error;

/// Errors surfaced when publishing to the live stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The stream's dispatch loop has shut down and its queue is closed.
    #[error("event stream is closed")]
    Closed,
}

/// Errors surfaced by the outbox relay while draining a batch.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The event store failed to load or mark a batch.
    #[error("event store error: {0}")]
    Store(#[from] event_store::EventStoreError),

    /// The live stream rejected the batch. The batch stays unpublished and
    /// is retried on the next tick.
    #[error("stream publish error: {0}")]
    Stream(#[from] StreamError),
}
