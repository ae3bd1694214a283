//! Row structs for the bulkmail tables.
//!
//! Each submodule contains a `FromRow` struct matching the database row and
//! its conversion into the corresponding `bulkmail_core` type.

pub mod batch;
pub mod content;
pub mod customer;
pub mod image;
pub mod message;
