use chrono::{DateTime, Utc};
use common::{AggregateId, Principal};
use event_store::{DomainEvent, EventRegistry};
use serde::{Deserialize, Serialize};

pub const CONTACT_CREATED: &str = "contact.created";
pub const CONTACT_EMAIL_UPDATED: &str = "contact.updated-email";
pub const CONTACT_NAME_UPDATED: &str = "contact.updated-name";
pub const CONTACT_PHONE_UPDATED: &str = "contact.updated-phone";
pub const CONTACT_DELETED: &str = "contact.deleted";

/// Payload of [`CONTACT_CREATED`].
///
/// Carries the identity, creator and creation time so replay restores them
/// without consulting envelope metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactCreated {
    pub contact_id: AggregateId,
    pub created_by: Principal,
    pub created_at: DateTime<Utc>,
}

/// Payload of [`CONTACT_EMAIL_UPDATED`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactEmailUpdated {
    pub email: String,
    pub updated_at: DateTime<Utc>,
}

/// Payload of [`CONTACT_NAME_UPDATED`].
///
/// Always carries both names; a partial update merges with the current
/// values before the event is emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactNameUpdated {
    pub first_name: String,
    pub last_name: String,
    pub updated_at: DateTime<Utc>,
}

/// Payload of [`CONTACT_PHONE_UPDATED`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactPhoneUpdated {
    pub phone: String,
    pub updated_at: DateTime<Utc>,
}

/// Payload of [`CONTACT_DELETED`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactDeleted {
    pub deleted_at: DateTime<Utc>,
}

/// Everything that can happen to a contact, one variant per event type.
#[derive(Debug, Clone, PartialEq)]
pub enum ContactEvent {
    Created(ContactCreated),
    EmailUpdated(ContactEmailUpdated),
    NameUpdated(ContactNameUpdated),
    PhoneUpdated(ContactPhoneUpdated),
    Deleted(ContactDeleted),
}

impl DomainEvent for ContactEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ContactEvent::Created(_) => CONTACT_CREATED,
            ContactEvent::EmailUpdated(_) => CONTACT_EMAIL_UPDATED,
            ContactEvent::NameUpdated(_) => CONTACT_NAME_UPDATED,
            ContactEvent::PhoneUpdated(_) => CONTACT_PHONE_UPDATED,
            ContactEvent::Deleted(_) => CONTACT_DELETED,
        }
    }

    fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            ContactEvent::Created(data) => serde_json::to_value(data),
            ContactEvent::EmailUpdated(data) => serde_json::to_value(data),
            ContactEvent::NameUpdated(data) => serde_json::to_value(data),
            ContactEvent::PhoneUpdated(data) => serde_json::to_value(data),
            ContactEvent::Deleted(data) => serde_json::to_value(data),
        }
    }
}

/// Builds the registry covering every contact event type.
///
/// Constructed once at process start and passed into the store constructors.
pub fn contact_event_registry() -> EventRegistry<ContactEvent> {
    let mut registry = EventRegistry::new();
    registry.register(CONTACT_CREATED, |payload| {
        serde_json::from_value(payload).map(ContactEvent::Created)
    });
    registry.register(CONTACT_EMAIL_UPDATED, |payload| {
        serde_json::from_value(payload).map(ContactEvent::EmailUpdated)
    });
    registry.register(CONTACT_NAME_UPDATED, |payload| {
        serde_json::from_value(payload).map(ContactEvent::NameUpdated)
    });
    registry.register(CONTACT_PHONE_UPDATED, |payload| {
        serde_json::from_value(payload).map(ContactEvent::PhoneUpdated)
    });
    registry.register(CONTACT_DELETED, |payload| {
        serde_json::from_value(payload).map(ContactEvent::Deleted)
    });
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{EventId, Version};
    use event_store::EventEnvelope;
    use uuid::Uuid;

    fn envelope(event: &ContactEvent) -> EventEnvelope {
        EventEnvelope {
            event_id: EventId::new(),
            event_type: event.event_type().to_string(),
            aggregate_id: AggregateId::new(),
            aggregate_type: "contact".to_string(),
            version: Version::first(),
            issued_at: Utc::now(),
            issued_by: Principal::Authenticated(Uuid::new_v4()),
            payload: event.payload().unwrap(),
        }
    }

    #[test]
    fn every_event_type_round_trips_through_the_registry() {
        let registry = contact_event_registry();
        let now = Utc::now();
        let events = vec![
            ContactEvent::Created(ContactCreated {
                contact_id: AggregateId::new(),
                created_by: Principal::Authenticated(Uuid::new_v4()),
                created_at: now,
            }),
            ContactEvent::EmailUpdated(ContactEmailUpdated {
                email: "ada@example.com".to_string(),
                updated_at: now,
            }),
            ContactEvent::NameUpdated(ContactNameUpdated {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                updated_at: now,
            }),
            ContactEvent::PhoneUpdated(ContactPhoneUpdated {
                phone: "+33612345678".to_string(),
                updated_at: now,
            }),
            ContactEvent::Deleted(ContactDeleted { deleted_at: now }),
        ];

        for event in events {
            let hydrated = registry.hydrate(envelope(&event)).unwrap();
            assert_eq!(hydrated.event, event);
        }
    }

    #[test]
    fn registry_knows_all_contact_event_types() {
        let registry = contact_event_registry();
        for event_type in [
            CONTACT_CREATED,
            CONTACT_EMAIL_UPDATED,
            CONTACT_NAME_UPDATED,
            CONTACT_PHONE_UPDATED,
            CONTACT_DELETED,
        ] {
            assert!(registry.contains(event_type), "missing {event_type}");
        }
    }
}
