//! In-process delivery of stored events to live subscribers.
//!
//! Two cooperating pieces:
//! - [`EventStream`]: a bounded queue with a dispatch task that fans each
//!   published event out to every registered subscriber callback.
//! - [`OutboxRelay`]: a background polling loop that drains not-yet-published
//!   events from the store's outbox into the stream and marks them published,
//!   giving subscribers at-least-once delivery across crashes.

pub mod config;
pub mod error;
pub mod publisher;
pub mod relay;
pub mod stream;

pub use config::{RelayConfig, StreamConfig};
pub use error::{RelayError, StreamError};
pub use publisher::EventPublisher;
pub use relay::OutboxRelay;
pub use stream::{EventStream, SubscribeFn};
