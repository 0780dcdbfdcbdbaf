pub mod books;

pub use books::PostgresBookRepository;
