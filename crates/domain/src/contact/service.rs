//! Contact service providing a simplified API for contact operations.

use std::sync::Arc;

use common::AggregateId;
use event_store::EventStore;
use stream::EventPublisher;

use crate::command::CommandHandler;
use crate::contact::aggregate::Contact;
use crate::contact::commands::{CreateContact, DeleteContact, UpdateContact};
use crate::contact::events::ContactEvent;
use crate::error::DomainError;

/// High-level API for contact operations, wrapping the command handler.
pub struct ContactService<S> {
    handler: CommandHandler<S, Contact>,
}

impl<S: EventStore<ContactEvent>> ContactService<S> {
    pub fn new(store: Arc<S>, publisher: Arc<dyn EventPublisher<ContactEvent>>) -> Self {
        Self {
            handler: CommandHandler::new(store, publisher),
        }
    }

    /// Returns a reference to the underlying command handler.
    pub fn handler(&self) -> &CommandHandler<S, Contact> {
        &self.handler
    }

    /// Creates a new contact.
    #[tracing::instrument(skip(self, cmd), fields(contact_id = %cmd.contact_id))]
    pub async fn create(&self, cmd: CreateContact) -> Result<Contact, DomainError> {
        self.handler.handle(&cmd).await
    }

    /// Updates an existing contact's fields.
    #[tracing::instrument(skip(self, cmd), fields(contact_id = %cmd.contact_id))]
    pub async fn update(&self, cmd: UpdateContact) -> Result<Contact, DomainError> {
        self.handler.handle(&cmd).await
    }

    /// Soft-deletes a contact.
    #[tracing::instrument(skip(self, cmd), fields(contact_id = %cmd.contact_id))]
    pub async fn delete(&self, cmd: DeleteContact) -> Result<(), DomainError> {
        self.handler.handle(&cmd).await.map(|_| ())
    }

    /// Rehydrates a contact by id.
    ///
    /// Missing and soft-deleted contacts both come back as `NotFound`.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, contact_id: AggregateId) -> Result<Contact, DomainError> {
        let contact = self.handler.hydrate(contact_id).await?;
        if !contact.exists() || contact.is_deleted() {
            return Err(DomainError::NotFound);
        }
        Ok(contact)
    }
}
