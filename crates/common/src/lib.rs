//! Shared types for the contact event-sourcing core.

pub mod principal;
pub mod types;

pub use principal::Principal;
pub use types::{AggregateId, EventId, Version};
