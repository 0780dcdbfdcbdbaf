use async_trait::async_trait;

use shelfmark_model::{Book, BookId, BookPayload};

use crate::Result;

/// Typed gateway to the book table.
///
/// Lookups report a missing record as an absent value; mutations that
/// target a missing id fail with the not-found kind. Timestamp stamping
/// is owned here: `add` sets `created_at`, every other write sets
/// `updated_at`.
#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// All records in store-default order.
    async fn all(&self) -> Result<Vec<Book>>;

    async fn find(&self, id: BookId) -> Result<Option<Book>>;

    /// Insert a new record. The store assigns the id; `created_at` is
    /// stamped here, `updated_at` starts out null.
    async fn add(&self, payload: BookPayload) -> Result<Book>;

    /// Full-record replace by id, preserving `created_at` and stamping
    /// `updated_at`.
    async fn update(&self, id: BookId, payload: BookPayload) -> Result<()>;

    async fn delete(&self, id: BookId) -> Result<()>;

    /// First record with an exact ISBN match.
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>>;

    /// Records whose author contains the given substring, title ascending.
    async fn by_author(&self, author: &str) -> Result<Vec<Book>>;

    /// Records whose genre equals the given value case-insensitively,
    /// title ascending.
    async fn by_genre(&self, genre: &str) -> Result<Vec<Book>>;

    /// Newest `limit` records by creation time.
    async fn recent(&self, limit: i64) -> Result<Vec<Book>>;

    /// Top `limit` rated records; unrated records never appear.
    async fn top_rated(&self, limit: i64) -> Result<Vec<Book>>;

    /// Substring search over title, author, ISBN and description. A blank
    /// term behaves exactly like [`BookRepository::all`].
    async fn search(&self, term: &str) -> Result<Vec<Book>>;

    async fn count(&self) -> Result<i64>;

    /// Partial mutation used by the image workflow: writes only the cover
    /// reference and `updated_at`.
    async fn set_cover_image(&self, id: BookId, url: Option<String>) -> Result<()>;
}
