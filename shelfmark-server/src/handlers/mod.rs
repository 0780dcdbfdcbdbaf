pub mod books;
pub mod covers;
