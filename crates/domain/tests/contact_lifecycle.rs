//! End-to-end contact lifecycle against the in-memory store.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{AggregateId, Principal};
use domain::contact::{
    Contact, ContactEvent, ContactService, CreateContact, DeleteContact, UpdateContact,
    contact_event_registry,
};
use domain::{Aggregate, DomainError};
use event_store::{DomainEvent, EventStore, InMemoryEventStore, RecordedEvent};
use stream::{EventStream, OutboxRelay, RelayConfig};
use uuid::Uuid;

struct Harness {
    store: Arc<InMemoryEventStore<ContactEvent>>,
    stream: Arc<EventStream<ContactEvent>>,
    service: ContactService<InMemoryEventStore<ContactEvent>>,
    _shutdown: tokio::sync::watch::Sender<bool>,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryEventStore::new(Arc::new(contact_event_registry())));
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let stream = Arc::new(EventStream::spawn(64, shutdown_rx));
    let publisher: Arc<dyn stream::EventPublisher<ContactEvent>> = stream.clone();
    let service = ContactService::new(Arc::clone(&store), publisher);
    Harness {
        store,
        stream,
        service,
        _shutdown: shutdown_tx,
    }
}

fn update_email(contact_id: AggregateId, issued_by: Principal, email: &str) -> UpdateContact {
    UpdateContact {
        contact_id,
        issued_by,
        first_name: None,
        last_name: None,
        email: Some(email.to_string()),
        phone: None,
    }
}

#[tokio::test]
async fn full_contact_lifecycle() {
    let h = harness();
    let creator = Principal::Authenticated(Uuid::new_v4());

    // Create: one created event plus three field-set events, versions 1-4.
    let cmd = CreateContact::new(
        creator,
        "Ada",
        "Lovelace",
        "ada@example.com",
        "+33612345678",
    );
    let contact_id = cmd.contact_id;
    let created = h.service.create(cmd).await.unwrap();
    assert_eq!(created.version().as_i64(), 4);
    assert_eq!(created.first_name, "Ada");
    assert_eq!(created.last_name, "Lovelace");
    assert_eq!(created.email, "ada@example.com");
    assert_eq!(created.phone, "+33612345678");
    assert_eq!(h.store.event_count().await, 4);

    let hydrated = h.service.get(contact_id).await.unwrap();
    assert_eq!(hydrated, created);

    // Update the email: one event, version 5, other fields untouched.
    let updated = h
        .service
        .update(update_email(contact_id, creator, "countess@example.com"))
        .await
        .unwrap();
    assert_eq!(updated.version().as_i64(), 5);
    assert_eq!(updated.email, "countess@example.com");
    assert_eq!(updated.first_name, "Ada");
    assert_eq!(updated.phone, "+33612345678");

    // A different principal may not update; nothing is stored.
    let stranger = Principal::Authenticated(Uuid::new_v4());
    let result = h
        .service
        .update(update_email(contact_id, stranger, "stranger@example.com"))
        .await;
    assert!(matches!(result, Err(DomainError::Forbidden)));
    assert_eq!(h.store.event_count().await, 5);
    let unchanged = h.service.get(contact_id).await.unwrap();
    assert_eq!(unchanged.version().as_i64(), 5);
    assert_eq!(unchanged.email, "countess@example.com");

    // Delete: version 6.
    h.service
        .delete(DeleteContact {
            contact_id,
            issued_by: creator,
        })
        .await
        .unwrap();
    assert_eq!(h.store.event_count().await, 6);

    // Mutating a soft-deleted contact is not found; nothing new is stored.
    let result = h
        .service
        .update(update_email(contact_id, creator, "late@example.com"))
        .await;
    assert!(matches!(result, Err(DomainError::NotFound)));
    assert_eq!(h.store.event_count().await, 6);
}

#[tokio::test]
async fn version_history_is_gapless_and_starts_at_one() {
    let h = harness();
    let creator = Principal::Authenticated(Uuid::new_v4());

    let cmd = CreateContact::new(
        creator,
        "Ada",
        "Lovelace",
        "ada@example.com",
        "+33612345678",
    );
    let contact_id = cmd.contact_id;
    h.service.create(cmd).await.unwrap();
    h.service
        .update(update_email(contact_id, creator, "countess@example.com"))
        .await
        .unwrap();

    let events = h.store.load("contact", contact_id).await.unwrap();
    let versions: Vec<i64> = events.iter().map(|e| e.version.as_i64()).collect();
    assert_eq!(versions, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn live_publish_and_outbox_drain_reach_subscribers() {
    let h = harness();
    let creator = Principal::Authenticated(Uuid::new_v4());

    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    h.stream
        .subscribe(move |event: &RecordedEvent<ContactEvent>| {
            sink.lock().unwrap().push(event.event.event_type().to_string());
        })
        .await;

    let cmd = CreateContact::new(
        creator,
        "Ada",
        "Lovelace",
        "ada@example.com",
        "+33612345678",
    );
    h.service.create(cmd).await.unwrap();

    // The handler publishes synchronously after the append.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(seen.lock().unwrap().len(), 4);

    // The outbox still holds the events until the relay drains them.
    assert_eq!(h.store.unpublished_count().await, 4);
    let publisher: Arc<dyn stream::EventPublisher<ContactEvent>> = h.stream.clone();
    let relay = OutboxRelay::new(Arc::clone(&h.store), publisher, RelayConfig::default());
    assert_eq!(relay.drain_batch().await.unwrap(), 4);
    assert_eq!(h.store.unpublished_count().await, 0);

    // At-least-once: the drain redelivered the same four events.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(seen.lock().unwrap().len(), 8);
}

#[tokio::test]
async fn create_rejects_duplicate_aggregate() {
    let h = harness();
    let creator = Principal::Authenticated(Uuid::new_v4());

    let cmd = CreateContact::new(
        creator,
        "Ada",
        "Lovelace",
        "ada@example.com",
        "+33612345678",
    );
    let duplicate = cmd.clone();
    h.service.create(cmd).await.unwrap();

    let result = h.service.create(duplicate).await;
    assert!(matches!(result, Err(DomainError::AlreadyExists)));
}

#[tokio::test]
async fn replaying_the_stored_history_matches_the_returned_aggregate() {
    let h = harness();
    let creator = Principal::Authenticated(Uuid::new_v4());

    let cmd = CreateContact::new(
        creator,
        "Ada",
        "Lovelace",
        "ada@example.com",
        "+33612345678",
    );
    let contact_id = cmd.contact_id;
    let returned = h.service.create(cmd).await.unwrap();

    let events = h.store.load("contact", contact_id).await.unwrap();
    let mut replayed = Contact::default();
    for recorded in &events {
        replayed.apply(&recorded.event);
        replayed.set_version(recorded.version);
    }
    assert_eq!(replayed, returned);
}
