use async_trait::async_trait;

use crate::{
    AggregateId, DomainEvent, EventId, EventQuery, EventStoreError, RecordedEvent, Result,
    StoredEvent, Version,
};

/// Options for appending events to the store.
#[derive(Debug, Clone, Default)]
pub struct AppendOptions {
    /// Expected prior version of the aggregate. When set, the append is
    /// rejected with `ConcurrencyConflict` if the aggregate's highest stored
    /// version differs, making hydrate/apply/persist an optimistic write.
    pub expected_version: Option<Version>,
}

impl AppendOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the aggregate to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Creates options expecting the aggregate to have no events yet.
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// Durable append-only persistence for events, keyed by aggregate.
///
/// Alongside the log itself, implementations maintain the outbox ledger:
/// every appended event gets an unpublished outbox entry in the same
/// transaction, and the `load_unpublished` / `mark_published` pair is how the
/// outbox relay drains it. The relay is the sole caller of `mark_published`.
#[async_trait]
pub trait EventStore<E: DomainEvent>: Send + Sync {
    /// Appends a batch of events atomically.
    ///
    /// Either every event and its outbox entry is persisted, or none are.
    async fn append(&self, events: Vec<RecordedEvent<E>>, options: AppendOptions) -> Result<()>;

    /// Returns all events for an aggregate in ascending version order.
    ///
    /// An aggregate with no events yields an empty vec, not an error; that is
    /// how "aggregate does not exist" is represented upstream.
    async fn load(
        &self,
        aggregate_type: &str,
        aggregate_id: AggregateId,
    ) -> Result<Vec<RecordedEvent<E>>>;

    /// Returns up to `batch_size` events whose outbox entry is unpublished,
    /// in ascending aggregate-version order.
    ///
    /// The version sort is a global fairness heuristic, not a causal order
    /// across aggregates.
    async fn load_unpublished(&self, batch_size: usize) -> Result<Vec<RecordedEvent<E>>>;

    /// Flips the outbox entries for the given events to published.
    ///
    /// Idempotent: marking an already-published entry again is a no-op.
    async fn mark_published(&self, event_ids: &[EventId]) -> Result<()>;

    /// Returns events joined to their outbox status, filtered by `query`.
    ///
    /// This backs the administrative read path; the write path never uses it.
    async fn query_events(&self, query: EventQuery) -> Result<Vec<StoredEvent<E>>>;
}

/// Validates a batch before it is appended.
///
/// A valid batch is non-empty, addresses a single aggregate, and carries
/// strictly sequential versions; when an expected prior version is given the
/// batch must also start directly after it. This guards the version
/// monotonicity invariant at the storage boundary regardless of what
/// produced the batch.
pub fn validate_events_for_append<E: DomainEvent>(
    events: &[RecordedEvent<E>],
    options: &AppendOptions,
) -> Result<()> {
    let Some(first) = events.first() else {
        return Err(EventStoreError::InvalidBatch(
            "cannot append an empty event batch".to_string(),
        ));
    };

    if let Some(expected) = options.expected_version
        && first.version != expected.next()
    {
        return Err(EventStoreError::InvalidBatch(format!(
            "batch must start at version {} to follow expected version {expected}, got {}",
            expected.next(),
            first.version
        )));
    }

    for event in events.iter().skip(1) {
        if event.aggregate_id != first.aggregate_id {
            return Err(EventStoreError::InvalidBatch(
                "all events in a batch must target the same aggregate".to_string(),
            ));
        }
        if event.aggregate_type != first.aggregate_type {
            return Err(EventStoreError::InvalidBatch(
                "all events in a batch must share the aggregate type".to_string(),
            ));
        }
    }

    let mut expected = first.version;
    for event in events.iter().skip(1) {
        expected = expected.next();
        if event.version != expected {
            return Err(EventStoreError::InvalidBatch(format!(
                "event versions must be sequential: expected {expected}, got {}",
                event.version
            )));
        }
    }

    Ok(())
}
