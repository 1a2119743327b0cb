//! The contact aggregate: a person record owned by the principal that
//! created it, soft-deleted rather than erased.

pub mod aggregate;
pub mod commands;
pub mod events;
pub mod service;
mod validate;

pub use aggregate::{AGGREGATE_CONTACT, Contact};
pub use commands::{CreateContact, DeleteContact, UpdateContact};
pub use events::{
    CONTACT_CREATED, CONTACT_DELETED, CONTACT_EMAIL_UPDATED, CONTACT_NAME_UPDATED,
    CONTACT_PHONE_UPDATED, ContactCreated, ContactDeleted, ContactEmailUpdated, ContactEvent,
    ContactNameUpdated, ContactPhoneUpdated, contact_event_registry,
};
pub use service::ContactService;
