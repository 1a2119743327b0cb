//! The write path: aggregates materialized by replay, commands validated
//! against them, and the handler that turns accepted commands into stored,
//! published events.
//!
//! An aggregate has no persisted row of its own. It is rebuilt on every
//! command by folding its full event history, and its version advances by
//! exactly one per applied event. The [`CommandHandler`] runs the
//! hydrate/validate/apply/persist/publish pipeline; the [`contact`] module is
//! the one concrete domain built on top of it.

pub mod aggregate;
pub mod command;
pub mod contact;
pub mod error;

pub use aggregate::Aggregate;
pub use command::{Command, CommandHandler};
pub use error::DomainError;
