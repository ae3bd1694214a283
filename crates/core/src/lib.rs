//! Bulkmail domain layer.
//!
//! Pure types and rules for mass email batches: batch definitions and the
//! message factory, recipients, images, render contexts, validation, and the
//! store / transport traits the dispatch engine is written against. Nothing
//! in this crate performs I/O.

pub mod batch;
pub mod error;
pub mod image;
pub mod message;
pub mod recipient;
pub mod render;
pub mod report;
pub mod store;
pub mod transport;
pub mod types;
