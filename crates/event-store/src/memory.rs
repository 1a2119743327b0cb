use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, DomainEvent, EventEnvelope, EventId, EventQuery, EventRegistry, EventStoreError,
    RecordedEvent, Result, StoredEvent, Version,
    store::{AppendOptions, EventStore, validate_events_for_append},
};

struct StoredRow {
    envelope: EventEnvelope,
    published: bool,
}

/// In-memory event store implementation for testing.
///
/// Stores serialized envelopes and re-hydrates them through the registry on
/// load, so tests exercise the same serialization round-trip as the
/// PostgreSQL implementation.
pub struct InMemoryEventStore<E> {
    registry: Arc<EventRegistry<E>>,
    rows: Arc<RwLock<Vec<StoredRow>>>,
}

impl<E> Clone for InMemoryEventStore<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<E> InMemoryEventStore<E> {
    /// Creates an empty store hydrating through the given registry.
    pub fn new(registry: Arc<EventRegistry<E>>) -> Self {
        Self {
            registry,
            rows: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Returns the total number of events stored.
    pub async fn event_count(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Returns the number of events not yet marked published.
    pub async fn unpublished_count(&self) -> usize {
        self.rows.read().await.iter().filter(|r| !r.published).count()
    }

    /// Clears all events and outbox state.
    pub async fn clear(&self) {
        self.rows.write().await.clear();
    }
}

#[async_trait]
impl<E: DomainEvent> EventStore<E> for InMemoryEventStore<E> {
    async fn append(&self, events: Vec<RecordedEvent<E>>, options: AppendOptions) -> Result<()> {
        validate_events_for_append(&events, &options)?;

        // Serialize before taking the lock so a failure leaves nothing
        // behind, mirroring the all-or-nothing transaction.
        let envelopes = events
            .iter()
            .map(RecordedEvent::to_envelope)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let aggregate_id = events[0].aggregate_id;
        let mut rows = self.rows.write().await;

        let current_version = rows
            .iter()
            .filter(|r| r.envelope.aggregate_id == aggregate_id)
            .map(|r| r.envelope.version)
            .max()
            .unwrap_or(Version::initial());

        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual: current_version,
            });
        }

        // Simulates the (aggregate_id, aggregate_version) unique constraint.
        let first_new_version = envelopes[0].version;
        if first_new_version <= current_version {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected: options.expected_version.unwrap_or(current_version),
                actual: current_version,
            });
        }

        metrics::counter!("event_store_events_appended").increment(envelopes.len() as u64);
        rows.extend(envelopes.into_iter().map(|envelope| StoredRow {
            envelope,
            published: false,
        }));

        Ok(())
    }

    async fn load(
        &self,
        aggregate_type: &str,
        aggregate_id: AggregateId,
    ) -> Result<Vec<RecordedEvent<E>>> {
        let rows = self.rows.read().await;
        let mut envelopes: Vec<_> = rows
            .iter()
            .filter(|r| {
                r.envelope.aggregate_id == aggregate_id
                    && r.envelope.aggregate_type == aggregate_type
            })
            .map(|r| r.envelope.clone())
            .collect();
        envelopes.sort_by_key(|e| e.version);

        envelopes
            .into_iter()
            .map(|e| self.registry.hydrate(e))
            .collect()
    }

    async fn load_unpublished(&self, batch_size: usize) -> Result<Vec<RecordedEvent<E>>> {
        let rows = self.rows.read().await;
        let mut envelopes: Vec<_> = rows
            .iter()
            .filter(|r| !r.published)
            .map(|r| r.envelope.clone())
            .collect();
        envelopes.sort_by_key(|e| e.version);
        envelopes.truncate(batch_size);

        envelopes
            .into_iter()
            .map(|e| self.registry.hydrate(e))
            .collect()
    }

    async fn mark_published(&self, event_ids: &[EventId]) -> Result<()> {
        let mut rows = self.rows.write().await;
        for row in rows.iter_mut() {
            if event_ids.contains(&row.envelope.event_id) {
                row.published = true;
            }
        }
        Ok(())
    }

    async fn query_events(&self, query: EventQuery) -> Result<Vec<StoredEvent<E>>> {
        let rows = self.rows.read().await;
        let mut matched: Vec<_> = rows
            .iter()
            .filter(|r| {
                if let Some(id) = query.aggregate_id
                    && r.envelope.aggregate_id != id
                {
                    return false;
                }
                if let Some(ref aggregate_type) = query.aggregate_type
                    && &r.envelope.aggregate_type != aggregate_type
                {
                    return false;
                }
                if let Some(published) = query.published
                    && r.published != published
                {
                    return false;
                }
                true
            })
            .map(|r| (r.envelope.clone(), r.published))
            .collect();

        matched.sort_by(|a, b| {
            a.0.issued_at
                .cmp(&b.0.issued_at)
                .then(a.0.version.cmp(&b.0.version))
        });
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        matched
            .into_iter()
            .map(|(envelope, published)| {
                Ok(StoredEvent {
                    event: self.registry.hydrate(envelope)?,
                    published,
                })
            })
            .collect()
    }
}
