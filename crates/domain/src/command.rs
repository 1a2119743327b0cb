use std::marker::PhantomData;
use std::sync::Arc;

use common::{AggregateId, Principal};
use event_store::{AppendOptions, EventStore, RecordedEvent};
use stream::EventPublisher;

use crate::{Aggregate, DomainError};

/// A validated intent to mutate one aggregate.
pub trait Command: Send + Sync {
    /// The aggregate this command targets.
    type Aggregate: Aggregate;

    /// The id of the target aggregate.
    fn aggregate_id(&self) -> AggregateId;

    /// The principal issuing the command.
    fn issued_by(&self) -> Principal;

    /// Structural field validation, run before any I/O.
    fn validate(&self) -> Result<(), DomainError> {
        Ok(())
    }

    /// Checks the command against the hydrated aggregate and produces the
    /// resulting events.
    ///
    /// This is where existence preconditions, authorization policy and
    /// domain invariants are enforced. Returning an empty vec means the
    /// command is a no-op; nothing is stored or published.
    fn apply(
        &self,
        aggregate: &Self::Aggregate,
    ) -> Result<Vec<<Self::Aggregate as Aggregate>::Event>, DomainError>;
}

/// The single write-path entry point.
///
/// Stateless across invocations; consistency comes from the optimistic
/// hydrate/apply/conditional-append protocol, not from locking. Two
/// concurrent commands against the same aggregate both hydrate, but only the
/// first append wins; the second fails with a concurrency conflict.
pub struct CommandHandler<S, A: Aggregate> {
    store: Arc<S>,
    publisher: Arc<dyn EventPublisher<A::Event>>,
    _marker: PhantomData<A>,
}

impl<S, A> CommandHandler<S, A>
where
    S: EventStore<A::Event>,
    A: Aggregate,
{
    pub fn new(store: Arc<S>, publisher: Arc<dyn EventPublisher<A::Event>>) -> Self {
        Self {
            store,
            publisher,
            _marker: PhantomData,
        }
    }

    /// Rebuilds an aggregate by replaying its full event history.
    ///
    /// An aggregate with no events comes back in its uninitialized state
    /// rather than as an error.
    pub async fn hydrate(&self, aggregate_id: AggregateId) -> Result<A, DomainError> {
        let events = self.store.load(A::aggregate_type(), aggregate_id).await?;

        let mut aggregate = A::default();
        for recorded in &events {
            aggregate.apply(&recorded.event);
            aggregate.set_version(recorded.version);
        }

        Ok(aggregate)
    }

    /// Runs one command through the full pipeline and returns the
    /// post-command aggregate.
    ///
    /// The append is conditional on the aggregate still being at its
    /// hydrated version, so a concurrent writer surfaces as
    /// `EventStoreError::ConcurrencyConflict` instead of a lost update. A
    /// publish failure after a successful append is surfaced as
    /// [`DomainError::Publish`] while the events stay stored for the outbox
    /// relay to deliver.
    pub async fn handle<C>(&self, command: &C) -> Result<A, DomainError>
    where
        C: Command<Aggregate = A>,
    {
        command.validate()?;

        let mut aggregate = self.hydrate(command.aggregate_id()).await?;
        let hydrated_version = aggregate.version();

        let events = command.apply(&aggregate)?;
        if events.is_empty() {
            return Ok(aggregate);
        }

        let mut version = hydrated_version;
        let mut recorded = Vec::with_capacity(events.len());
        for event in events {
            version = version.next();
            aggregate.apply(&event);
            aggregate.set_version(version);
            recorded.push(RecordedEvent::new(
                command.aggregate_id(),
                A::aggregate_type(),
                version,
                command.issued_by(),
                event,
            ));
        }

        tracing::debug!(
            aggregate_id = %command.aggregate_id(),
            aggregate_type = A::aggregate_type(),
            count = recorded.len(),
            "persisting command events"
        );

        self.store
            .append(recorded.clone(), AppendOptions::expect_version(hydrated_version))
            .await?;
        metrics::counter!("domain_commands_handled").increment(1);

        self.publisher.publish(recorded).await?;

        Ok(aggregate)
    }
}
