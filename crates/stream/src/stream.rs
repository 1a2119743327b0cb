use std::sync::Arc;

use async_trait::async_trait;
use event_store::RecordedEvent;
use tokio::sync::{RwLock, mpsc, watch};

use crate::{EventPublisher, StreamError};

/// A subscriber callback, invoked synchronously for each dispatched event.
pub type SubscribeFn<E> = Box<dyn Fn(&RecordedEvent<E>) + Send + Sync>;

/// Bounded in-process pub/sub for one aggregate type's events.
///
/// `publish` enqueues; a dedicated dispatch task dequeues and invokes every
/// registered subscriber in registration order. Subscribing does not replay
/// history; a subscriber sees only events published after it registered.
///
/// Dispatch holds a shared lock on the subscriber list while it runs the
/// callbacks, so a slow subscriber stalls delivery of subsequent events to
/// all subscribers of this stream.
pub struct EventStream<E> {
    tx: mpsc::Sender<RecordedEvent<E>>,
    subscribers: Arc<RwLock<Vec<SubscribeFn<E>>>>,
}

impl<E: Send + Sync + 'static> EventStream<E> {
    /// Creates a stream and spawns its dispatch task.
    ///
    /// The task runs until the shutdown signal fires, at which point the
    /// queue is closed; publishing after that fails with
    /// [`StreamError::Closed`].
    pub fn spawn(buffer: usize, mut shutdown: watch::Receiver<bool>) -> Self {
        let (tx, mut rx) = mpsc::channel::<RecordedEvent<E>>(buffer);
        let subscribers: Arc<RwLock<Vec<SubscribeFn<E>>>> = Arc::new(RwLock::new(Vec::new()));

        let dispatch_subscribers = Arc::clone(&subscribers);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = rx.recv() => {
                        let Some(event) = event else { break };
                        let subscribers = dispatch_subscribers.read().await;
                        for subscriber in subscribers.iter() {
                            subscriber(&event);
                        }
                        metrics::counter!("stream_events_dispatched").increment(1);
                    }
                    _ = shutdown.changed() => {
                        rx.close();
                        break;
                    }
                }
            }
        });

        Self { tx, subscribers }
    }

    /// Registers a callback for future events.
    pub async fn subscribe(&self, subscriber: impl Fn(&RecordedEvent<E>) + Send + Sync + 'static) {
        self.subscribers.write().await.push(Box::new(subscriber));
    }

    /// Returns the number of registered subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}

#[async_trait]
impl<E: Clone + Send + Sync + 'static> EventPublisher<E> for EventStream<E> {
    async fn publish(&self, events: Vec<RecordedEvent<E>>) -> Result<(), StreamError> {
        for event in events {
            tracing::debug!(
                event_id = %event.event_id,
                aggregate_id = %event.aggregate_id,
                version = %event.version,
                "publishing event"
            );
            self.tx.send(event).await.map_err(|_| StreamError::Closed)?;
        }
        Ok(())
    }
}
