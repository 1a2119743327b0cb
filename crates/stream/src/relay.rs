use std::marker::PhantomData;
use std::sync::Arc;

use event_store::{DomainEvent, EventStore};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::{EventPublisher, RelayConfig, RelayError};

/// Background loop that moves outbox rows onto the live stream.
///
/// Each tick loads a batch of unpublished events, pushes them to the stream,
/// then marks them published. A publish failure leaves the batch unmarked so
/// the next tick retries it; subscribers must tolerate duplicates.
pub struct OutboxRelay<S, E> {
    store: Arc<S>,
    stream: Arc<dyn EventPublisher<E>>,
    config: RelayConfig,
    _marker: PhantomData<E>,
}

impl<S, E> OutboxRelay<S, E>
where
    S: EventStore<E>,
    E: DomainEvent,
{
    pub fn new(store: Arc<S>, stream: Arc<dyn EventPublisher<E>>, config: RelayConfig) -> Self {
        Self {
            store,
            stream,
            config,
            _marker: PhantomData,
        }
    }

    /// Polls the outbox on a fixed interval until the shutdown signal fires.
    ///
    /// Drain errors are logged and the loop keeps going; a transient store or
    /// stream failure must not kill delivery for good.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            batch_size = self.config.batch_size,
            "outbox relay started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.drain_batch().await {
                        Ok(0) => {}
                        Ok(count) => {
                            tracing::debug!(count, "outbox batch relayed");
                        }
                        Err(error) => {
                            tracing::error!(%error, "outbox drain failed");
                        }
                    }
                }
                _ = shutdown.changed() => {
                    tracing::info!("outbox relay stopping");
                    break;
                }
            }
        }
    }

    /// Drains one batch of unpublished events. Returns how many were relayed.
    ///
    /// Marking happens only after a successful publish. A crash between the
    /// two redelivers the batch on restart, which is the at-least-once
    /// contract.
    pub async fn drain_batch(&self) -> Result<usize, RelayError> {
        let events = self.store.load_unpublished(self.config.batch_size).await?;
        if events.is_empty() {
            return Ok(0);
        }

        let ids: Vec<_> = events.iter().map(|event| event.event_id).collect();
        let count = events.len();

        self.stream.publish(events).await?;
        self.store.mark_published(&ids).await?;

        metrics::counter!("outbox_events_published").increment(count as u64);
        Ok(count)
    }
}
