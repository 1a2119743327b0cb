//! Durable append-only event persistence with a transactional outbox.
//!
//! Events are stored as generic envelopes (type tag + opaque JSON payload)
//! decoupled from the concrete domain event types. An [`EventRegistry`]
//! reconstructs the concrete types when events are loaded back. Every stored
//! event gets an outbox ledger row tracking whether it has been delivered to
//! live subscribers yet.

pub mod error;
pub mod event;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod registry;
pub mod store;

pub use common::{AggregateId, EventId, Principal, Version};
pub use error::{EventStoreError, Result};
pub use event::{DomainEvent, EventEnvelope, RecordedEvent, StoredEvent};
pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;
pub use query::EventQuery;
pub use registry::EventRegistry;
pub use store::{AppendOptions, EventStore, validate_events_for_append};
