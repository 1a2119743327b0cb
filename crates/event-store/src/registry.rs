//! Type-tag to factory mapping for polymorphic event reconstruction.

use std::collections::HashMap;

use crate::{EventEnvelope, EventStoreError, RecordedEvent, Result};

/// Decodes an opaque payload into a concrete event.
pub type EventFactory<E> =
    Box<dyn Fn(serde_json::Value) -> std::result::Result<E, serde_json::Error> + Send + Sync>;

/// Maps event type discriminators to payload decoders.
///
/// The store persists events as generic envelopes; the registry is the one
/// place that knows how to turn a `(type tag, payload)` pair back into a
/// concrete event. It is built once at process start, with every event type
/// registered before any load, and passed explicitly into the store
/// constructors.
pub struct EventRegistry<E> {
    factories: HashMap<String, EventFactory<E>>,
}

impl<E> EventRegistry<E> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Associates an event type discriminator with a payload decoder.
    ///
    /// Registering the same discriminator twice silently overwrites the
    /// previous factory.
    pub fn register<F>(&mut self, event_type: impl Into<String>, factory: F)
    where
        F: Fn(serde_json::Value) -> std::result::Result<E, serde_json::Error>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(event_type.into(), Box::new(factory));
    }

    /// Returns true if a factory is registered for the discriminator.
    pub fn contains(&self, event_type: &str) -> bool {
        self.factories.contains_key(event_type)
    }

    /// Reconstructs a concrete event from its persisted envelope.
    ///
    /// Looks up the factory by the envelope's type tag, decodes the payload
    /// and carries the envelope's metadata over to the hydrated event. An
    /// unregistered type tag is a hard [`EventStoreError::UnknownEventType`]
    /// error.
    pub fn hydrate(&self, envelope: EventEnvelope) -> Result<RecordedEvent<E>> {
        let factory = self
            .factories
            .get(&envelope.event_type)
            .ok_or_else(|| EventStoreError::UnknownEventType(envelope.event_type.clone()))?;

        let event = factory(envelope.payload)?;

        Ok(RecordedEvent {
            event_id: envelope.event_id,
            aggregate_id: envelope.aggregate_id,
            aggregate_type: envelope.aggregate_type,
            version: envelope.version,
            issued_at: envelope.issued_at,
            issued_by: envelope.issued_by,
            event,
        })
    }
}

impl<E> Default for EventRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AggregateId, DomainEvent, Principal, Version};
    use chrono::Utc;
    use common::EventId;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct CounterSet {
        value: i64,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TestEvent {
        Set(CounterSet),
        Cleared,
    }

    impl DomainEvent for TestEvent {
        fn event_type(&self) -> &'static str {
            match self {
                TestEvent::Set(_) => "counter.set",
                TestEvent::Cleared => "counter.cleared",
            }
        }

        fn payload(&self) -> std::result::Result<serde_json::Value, serde_json::Error> {
            match self {
                TestEvent::Set(data) => serde_json::to_value(data),
                TestEvent::Cleared => Ok(serde_json::json!({})),
            }
        }
    }

    fn registry() -> EventRegistry<TestEvent> {
        let mut registry = EventRegistry::new();
        registry.register("counter.set", |payload| {
            serde_json::from_value::<CounterSet>(payload).map(TestEvent::Set)
        });
        registry.register("counter.cleared", |_| Ok(TestEvent::Cleared));
        registry
    }

    fn envelope_for(event: &TestEvent) -> EventEnvelope {
        EventEnvelope {
            event_id: EventId::new(),
            event_type: event.event_type().to_string(),
            aggregate_id: AggregateId::new(),
            aggregate_type: "counter".to_string(),
            version: Version::first(),
            issued_at: Utc::now(),
            issued_by: Principal::Unauthenticated,
            payload: event.payload().unwrap(),
        }
    }

    #[test]
    fn hydrate_roundtrips_registered_types() {
        let registry = registry();

        for event in [TestEvent::Set(CounterSet { value: 42 }), TestEvent::Cleared] {
            let envelope = envelope_for(&event);
            let hydrated = registry.hydrate(envelope).unwrap();
            assert_eq!(hydrated.event, event);
            assert_eq!(hydrated.version, Version::first());
        }
    }

    #[test]
    fn hydrate_preserves_envelope_metadata() {
        let registry = registry();
        let event = TestEvent::Set(CounterSet { value: 7 });
        let envelope = envelope_for(&event);
        let event_id = envelope.event_id;
        let aggregate_id = envelope.aggregate_id;

        let hydrated = registry.hydrate(envelope).unwrap();
        assert_eq!(hydrated.event_id, event_id);
        assert_eq!(hydrated.aggregate_id, aggregate_id);
        assert_eq!(hydrated.aggregate_type, "counter");
    }

    #[test]
    fn hydrate_fails_on_unknown_type() {
        let registry = registry();
        let mut envelope = envelope_for(&TestEvent::Cleared);
        envelope.event_type = "counter.exploded".to_string();

        let result = registry.hydrate(envelope);
        assert!(matches!(
            result,
            Err(EventStoreError::UnknownEventType(t)) if t == "counter.exploded"
        ));
    }

    #[test]
    fn register_twice_overwrites() {
        let mut registry = registry();
        registry.register("counter.set", |_| Ok(TestEvent::Cleared));

        let envelope = envelope_for(&TestEvent::Set(CounterSet { value: 1 }));
        let hydrated = registry.hydrate(envelope).unwrap();
        assert_eq!(hydrated.event, TestEvent::Cleared);
    }
}
