//! Core data model definitions shared across Shelfmark crates.
#![allow(missing_docs)]

pub mod book;
pub mod ids;
pub mod validate;

pub use book::{Book, BookPayload};
pub use ids::BookId;
pub use validate::{FieldViolation, ValidationError};
