//! Core services for the Shelfmark book catalog: the Postgres-backed
//! repository and the cover-image object store.
#![allow(missing_docs)]

pub mod database;
pub mod error;
pub mod media;

pub use database::ports::BookRepository;
pub use database::postgres::PostgresBookRepository;
pub use error::{CatalogError, Result};
pub use media::CoverStore;

#[cfg(feature = "mocks")]
pub use database::ports::MockBookRepository;
