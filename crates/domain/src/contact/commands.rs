use chrono::Utc;
use common::{AggregateId, Principal};

use crate::contact::aggregate::Contact;
use crate::contact::events::{
    ContactCreated, ContactDeleted, ContactEmailUpdated, ContactEvent, ContactNameUpdated,
    ContactPhoneUpdated,
};
use crate::contact::validate;
use crate::{Command, DomainError};

/// Only the contact's creator may mutate it.
fn check_owner_policy(issued_by: Principal, contact: &Contact) -> Result<(), DomainError> {
    if issued_by.id() == contact.created_by.id() {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

/// Creates a new contact.
///
/// Emits the creating event followed by one field-set event per field, so a
/// fresh contact lands at version 4.
#[derive(Debug, Clone)]
pub struct CreateContact {
    pub contact_id: AggregateId,
    pub issued_by: Principal,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl CreateContact {
    /// Builds a create command with a freshly minted contact id.
    pub fn new(
        issued_by: Principal,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            contact_id: AggregateId::new(),
            issued_by,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}

impl Command for CreateContact {
    type Aggregate = Contact;

    fn aggregate_id(&self) -> AggregateId {
        self.contact_id
    }

    fn issued_by(&self) -> Principal {
        self.issued_by
    }

    fn validate(&self) -> Result<(), DomainError> {
        validate::name("first_name", &self.first_name)?;
        validate::name("last_name", &self.last_name)?;
        validate::email(&self.email)?;
        validate::phone(&self.phone)?;
        Ok(())
    }

    fn apply(&self, contact: &Contact) -> Result<Vec<ContactEvent>, DomainError> {
        if contact.exists() {
            return Err(DomainError::AlreadyExists);
        }

        let now = Utc::now();
        Ok(vec![
            ContactEvent::Created(ContactCreated {
                contact_id: self.contact_id,
                created_by: self.issued_by,
                created_at: now,
            }),
            ContactEvent::EmailUpdated(ContactEmailUpdated {
                email: self.email.clone(),
                updated_at: now,
            }),
            ContactEvent::NameUpdated(ContactNameUpdated {
                first_name: self.first_name.clone(),
                last_name: self.last_name.clone(),
                updated_at: now,
            }),
            ContactEvent::PhoneUpdated(ContactPhoneUpdated {
                phone: self.phone.clone(),
                updated_at: now,
            }),
        ])
    }
}

/// Updates an existing contact's fields.
///
/// Absent fields are left untouched; present fields only produce an event
/// when the value actually changes. Updating a soft-deleted contact is
/// rejected as not found.
#[derive(Debug, Clone)]
pub struct UpdateContact {
    pub contact_id: AggregateId,
    pub issued_by: Principal,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Command for UpdateContact {
    type Aggregate = Contact;

    fn aggregate_id(&self) -> AggregateId {
        self.contact_id
    }

    fn issued_by(&self) -> Principal {
        self.issued_by
    }

    fn validate(&self) -> Result<(), DomainError> {
        if let Some(first_name) = &self.first_name {
            validate::name("first_name", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            validate::name("last_name", last_name)?;
        }
        if let Some(email) = &self.email {
            validate::email(email)?;
        }
        if let Some(phone) = &self.phone {
            validate::phone(phone)?;
        }
        Ok(())
    }

    fn apply(&self, contact: &Contact) -> Result<Vec<ContactEvent>, DomainError> {
        if !contact.exists() {
            return Err(DomainError::NotFound);
        }
        check_owner_policy(self.issued_by, contact)?;
        if contact.is_deleted() {
            return Err(DomainError::NotFound);
        }

        let now = Utc::now();
        let mut events = Vec::new();

        // Both names travel in one event; merge the absent side from the
        // current state.
        if self.first_name.is_some() || self.last_name.is_some() {
            let first_name = self.first_name.as_ref().unwrap_or(&contact.first_name);
            let last_name = self.last_name.as_ref().unwrap_or(&contact.last_name);
            if first_name != &contact.first_name || last_name != &contact.last_name {
                events.push(ContactEvent::NameUpdated(ContactNameUpdated {
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                    updated_at: now,
                }));
            }
        }

        if let Some(email) = &self.email
            && email != &contact.email
        {
            events.push(ContactEvent::EmailUpdated(ContactEmailUpdated {
                email: email.clone(),
                updated_at: now,
            }));
        }

        if let Some(phone) = &self.phone
            && phone != &contact.phone
        {
            events.push(ContactEvent::PhoneUpdated(ContactPhoneUpdated {
                phone: phone.clone(),
                updated_at: now,
            }));
        }

        Ok(events)
    }
}

/// Soft-deletes an existing contact.
#[derive(Debug, Clone)]
pub struct DeleteContact {
    pub contact_id: AggregateId,
    pub issued_by: Principal,
}

impl Command for DeleteContact {
    type Aggregate = Contact;

    fn aggregate_id(&self) -> AggregateId {
        self.contact_id
    }

    fn issued_by(&self) -> Principal {
        self.issued_by
    }

    fn apply(&self, contact: &Contact) -> Result<Vec<ContactEvent>, DomainError> {
        if !contact.exists() {
            return Err(DomainError::NotFound);
        }
        check_owner_policy(self.issued_by, contact)?;
        if contact.is_deleted() {
            return Err(DomainError::NotFound);
        }

        Ok(vec![ContactEvent::Deleted(ContactDeleted {
            deleted_at: Utc::now(),
        })])
    }
}
