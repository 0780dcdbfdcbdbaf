//! Repository ports. Handlers depend on these traits; the Postgres
//! adapters live under [`crate::database::postgres`].

pub mod books;

pub use books::BookRepository;

#[cfg(feature = "mocks")]
pub use books::MockBookRepository;
