//! The bulkmail dispatch engine.
//!
//! - [`DispatchCoordinator`] walks a recipient list for one batch, skipping
//!   suppressed recipients and firing the [`DeliveryTrigger`] for every
//!   message it stores.
//! - [`UnsubscribeHandler`] drives the two-step unsubscribe protocol.
//! - [`MassEmailService`] is the entry point used by the HTTP layer.
//!
//! Every component is written against the store and transport traits in
//! `bulkmail_core`, so the engine runs unchanged over PostgreSQL or the
//! in-memory [`memory::MemoryStore`].

pub mod config;
pub mod coordinator;
pub mod eligibility;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod service;
pub mod trigger;
pub mod unsubscribe;

pub use config::DispatchConfig;
pub use coordinator::{DispatchCoordinator, DispatchError};
pub use eligibility::EligibilityFilter;
pub use service::{DispatchReport, MassEmailService, Stores};
pub use trigger::DeliveryTrigger;
pub use unsubscribe::{UnsubscribeHandler, UnsubscribeOutcome, UnsubscribeRequest, UnsubscribeView};
