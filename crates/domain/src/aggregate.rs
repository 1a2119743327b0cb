use common::{AggregateId, Version};
use event_store::DomainEvent;

/// The replay-derived state of one domain entity.
///
/// Aggregates are transient materializations: `Default` gives the
/// new/uninitialized state (version 0, no identity), and folding the event
/// history over [`apply`](Aggregate::apply) produces the current state. The
/// uninitialized state is distinguishable via [`id`](Aggregate::id) returning
/// `None`, which is how commands test "must already exist" and "must not
/// already exist" preconditions.
pub trait Aggregate: Default + Clone + Send + Sync {
    /// The event type this aggregate is built from.
    type Event: DomainEvent;

    /// The aggregate type tag (e.g. `"contact"`).
    fn aggregate_type() -> &'static str;

    /// The aggregate's identity, `None` until the creating event is applied.
    fn id(&self) -> Option<AggregateId>;

    /// The aggregate's current version.
    fn version(&self) -> Version;

    /// Sets the aggregate's version.
    ///
    /// Called by the command handler after each applied event, keeping the
    /// fold itself pure aside from this counter.
    fn set_version(&mut self, version: Version);

    /// Mutates the aggregate with one event's state transition.
    ///
    /// Replaying the same event twice double-applies it; callers must feed
    /// each stored event exactly once, in version order.
    fn apply(&mut self, event: &Self::Event);
}
