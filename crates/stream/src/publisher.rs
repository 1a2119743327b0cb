use async_trait::async_trait;
use event_store::RecordedEvent;

use crate::StreamError;

/// Pushes events to live subscribers.
///
/// The command handler publishes synchronously after a successful append;
/// the outbox relay publishes the batches it drains. Both go through this
/// trait so the write path does not depend on a concrete stream.
#[async_trait]
pub trait EventPublisher<E>: Send + Sync {
    /// Enqueues events for delivery to all subscribers.
    ///
    /// May block when the underlying queue is full; this is the natural
    /// backpressure on publication.
    async fn publish(&self, events: Vec<RecordedEvent<E>>) -> Result<(), StreamError>;
}
