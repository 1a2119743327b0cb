use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AggregateId, EventId, Principal, Version};

/// A concrete domain event.
///
/// Domain events are immutable facts, named in past tense. The envelope
/// stores the type tag and the payload separately, so an event exposes both:
/// the tag identifies the variant, the payload holds only the variant's data.
pub trait DomainEvent: Clone + Send + Sync + 'static {
    /// Returns the event type discriminator (e.g. `"contact.created"`).
    ///
    /// This is the registry key used to reconstruct the event on load.
    fn event_type(&self) -> &'static str;

    /// Serializes the event's payload, without the type tag.
    fn payload(&self) -> Result<serde_json::Value, serde_json::Error>;
}

/// The generic persisted form of an event.
///
/// This is the shape that reaches the database: all common metadata plus an
/// opaque JSON payload. It carries no knowledge of the concrete event types,
/// which is what lets the store schema stay fixed while the set of event
/// types grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique identifier for this event.
    pub event_id: EventId,

    /// The event type discriminator.
    pub event_type: String,

    /// The aggregate this event belongs to.
    pub aggregate_id: AggregateId,

    /// The type of aggregate (e.g. `"contact"`).
    pub aggregate_type: String,

    /// The version of the aggregate after this event is applied.
    pub version: Version,

    /// When the event was issued.
    pub issued_at: DateTime<Utc>,

    /// The principal that issued the event.
    pub issued_by: Principal,

    /// The event payload as JSON.
    pub payload: serde_json::Value,
}

/// An event with its metadata, hydrated back into its concrete type.
///
/// This is what the store hands out: the envelope's common fields plus the
/// decoded domain event.
#[derive(Debug, Clone)]
pub struct RecordedEvent<E> {
    /// Unique identifier for this event.
    pub event_id: EventId,

    /// The aggregate this event belongs to.
    pub aggregate_id: AggregateId,

    /// The type of aggregate.
    pub aggregate_type: String,

    /// The version of the aggregate after this event is applied.
    pub version: Version,

    /// When the event was issued.
    pub issued_at: DateTime<Utc>,

    /// The principal that issued the event.
    pub issued_by: Principal,

    /// The concrete domain event.
    pub event: E,
}

impl<E: DomainEvent> RecordedEvent<E> {
    /// Records a freshly produced event, stamping a new id and the current
    /// time.
    pub fn new(
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        version: Version,
        issued_by: Principal,
        event: E,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            version,
            issued_at: Utc::now(),
            issued_by,
            event,
        }
    }

    /// Converts the event into its generic persisted form.
    pub fn to_envelope(&self) -> Result<EventEnvelope, serde_json::Error> {
        Ok(EventEnvelope {
            event_id: self.event_id,
            event_type: self.event.event_type().to_string(),
            aggregate_id: self.aggregate_id,
            aggregate_type: self.aggregate_type.clone(),
            version: self.version,
            issued_at: self.issued_at,
            issued_by: self.issued_by,
            payload: self.event.payload()?,
        })
    }
}

/// An event together with its outbox delivery status.
///
/// Returned by the administrative query path, which lists events joined to
/// their outbox entries.
#[derive(Debug, Clone)]
pub struct StoredEvent<E> {
    /// The hydrated event.
    pub event: RecordedEvent<E>,

    /// Whether the outbox relay has delivered this event to subscribers.
    pub published: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Renamed {
        name: String,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TestEvent {
        Renamed(Renamed),
    }

    impl DomainEvent for TestEvent {
        fn event_type(&self) -> &'static str {
            match self {
                TestEvent::Renamed(_) => "test.renamed",
            }
        }

        fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
            match self {
                TestEvent::Renamed(data) => serde_json::to_value(data),
            }
        }
    }

    #[test]
    fn recorded_event_stamps_unique_ids() {
        let aggregate_id = AggregateId::new();
        let event = TestEvent::Renamed(Renamed {
            name: "sam".to_string(),
        });

        let a = RecordedEvent::new(
            aggregate_id,
            "test",
            Version::first(),
            Principal::Unauthenticated,
            event.clone(),
        );
        let b = RecordedEvent::new(
            aggregate_id,
            "test",
            Version::new(2),
            Principal::Unauthenticated,
            event,
        );
        assert_ne!(a.event_id, b.event_id);
    }

    #[test]
    fn envelope_carries_type_tag_and_payload() {
        let recorded = RecordedEvent::new(
            AggregateId::new(),
            "test",
            Version::first(),
            Principal::Unauthenticated,
            TestEvent::Renamed(Renamed {
                name: "sam".to_string(),
            }),
        );

        let envelope = recorded.to_envelope().unwrap();
        assert_eq!(envelope.event_type, "test.renamed");
        assert_eq!(envelope.version, Version::first());
        assert_eq!(envelope.payload, serde_json::json!({"name": "sam"}));
    }
}
