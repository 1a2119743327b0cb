use chrono::{DateTime, Utc};
use common::{AggregateId, Principal, Version};

use crate::Aggregate;
use crate::contact::events::ContactEvent;

pub const AGGREGATE_CONTACT: &str = "contact";

/// A contact as materialized from its event history.
///
/// Deletion is soft: the `contact.deleted` event sets `deleted_at` and the
/// commands treat a deleted contact as not found, but its history stays in
/// the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contact {
    id: Option<AggregateId>,
    version: Version,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_by: Principal,

    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl Contact {
    /// Returns true once the creating event has been applied.
    pub fn exists(&self) -> bool {
        self.id.is_some()
    }

    /// Returns true if the contact has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Aggregate for Contact {
    type Event = ContactEvent;

    fn aggregate_type() -> &'static str {
        AGGREGATE_CONTACT
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: &ContactEvent) {
        match event {
            ContactEvent::Created(data) => {
                self.id = Some(data.contact_id);
                self.created_by = data.created_by;
                self.created_at = Some(data.created_at);
                self.updated_at = Some(data.created_at);
            }
            ContactEvent::EmailUpdated(data) => {
                self.email = data.email.clone();
                self.updated_at = Some(data.updated_at);
            }
            ContactEvent::NameUpdated(data) => {
                self.first_name = data.first_name.clone();
                self.last_name = data.last_name.clone();
                self.updated_at = Some(data.updated_at);
            }
            ContactEvent::PhoneUpdated(data) => {
                self.phone = data.phone.clone();
                self.updated_at = Some(data.updated_at);
            }
            ContactEvent::Deleted(data) => {
                self.deleted_at = Some(data.deleted_at);
            }
        }
    }
}
