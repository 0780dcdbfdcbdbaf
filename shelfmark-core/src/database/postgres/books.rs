use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use shelfmark_model::{Book, BookId, BookPayload};

use crate::database::ports::books::BookRepository;
use crate::{CatalogError, Result};

/// SQLSTATE for unique-constraint violations. The `books_isbn_key`
/// constraint stays the final authority on ISBN uniqueness; the
/// handler-level pre-check only exists for a friendlier message.
const UNIQUE_VIOLATION: &str = "23505";

const BOOK_COLUMNS: &str = "id, title, author, isbn, publication_date, publisher, \
     page_count, genre, description, cover_image_url, rating, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: Option<String>,
    isbn: Option<String>,
    publication_date: Option<NaiveDate>,
    publisher: Option<String>,
    page_count: Option<i32>,
    genre: Option<String>,
    description: Option<String>,
    cover_image_url: Option<String>,
    rating: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: BookId(row.id),
            title: row.title,
            author: row.author,
            isbn: row.isbn,
            publication_date: row.publication_date,
            publisher: row.publisher,
            page_count: row.page_count,
            genre: row.genre,
            description: row.description,
            cover_image_url: row.cover_image_url,
            rating: row.rating,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PostgresBookRepository {
    pool: PgPool,
}

impl PostgresBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Escape LIKE metacharacters so a user-supplied term matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn db_err(err: sqlx::Error) -> CatalogError {
    if let sqlx::Error::Database(db) = &err
        && db.code().as_deref() == Some(UNIQUE_VIOLATION)
    {
        return CatalogError::Conflict("a book with this ISBN already exists".to_string());
    }
    CatalogError::Database(err)
}

#[async_trait]
impl BookRepository for PostgresBookRepository {
    async fn all(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!("SELECT {} FROM books", BOOK_COLUMNS))
            .fetch_all(self.pool())
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn find(&self, id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {} FROM books WHERE id = $1",
            BOOK_COLUMNS
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?;

        Ok(row.map(Book::from))
    }

    async fn add(&self, payload: BookPayload) -> Result<Book> {
        // Creation stamp is explicit rather than a column default so the
        // repository owns all timestamp bookkeeping.
        let created_at = Utc::now();

        let row = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            INSERT INTO books (
                title, author, isbn, publication_date, publisher,
                page_count, genre, description, cover_image_url, rating,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NULL)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&payload.title)
        .bind(&payload.author)
        .bind(payload.isbn_trimmed())
        .bind(payload.publication_date)
        .bind(&payload.publisher)
        .bind(payload.page_count)
        .bind(&payload.genre)
        .bind(&payload.description)
        .bind(&payload.cover_image_url)
        .bind(payload.rating)
        .bind(created_at)
        .fetch_one(self.pool())
        .await
        .map_err(db_err)?;

        Ok(row.into())
    }

    async fn update(&self, id: BookId, payload: BookPayload) -> Result<()> {
        let updated_at = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE books
            SET
                title = $1,
                author = $2,
                isbn = $3,
                publication_date = $4,
                publisher = $5,
                page_count = $6,
                genre = $7,
                description = $8,
                cover_image_url = $9,
                rating = $10,
                updated_at = $11
            WHERE id = $12
            "#,
        )
        .bind(&payload.title)
        .bind(&payload.author)
        .bind(payload.isbn_trimmed())
        .bind(payload.publication_date)
        .bind(&payload.publisher)
        .bind(payload.page_count)
        .bind(&payload.genre)
        .bind(&payload.description)
        .bind(&payload.cover_image_url)
        .bind(payload.rating)
        .bind(updated_at)
        .bind(id.as_i64())
        .execute(self.pool())
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("book {} not found", id)));
        }

        Ok(())
    }

    async fn delete(&self, id: BookId) -> Result<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id.as_i64())
            .execute(self.pool())
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("book {} not found", id)));
        }

        Ok(())
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {} FROM books WHERE isbn = $1 LIMIT 1",
            BOOK_COLUMNS
        ))
        .bind(isbn)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?;

        Ok(row.map(Book::from))
    }

    async fn by_author(&self, author: &str) -> Result<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {} FROM books WHERE author LIKE $1 ORDER BY title ASC",
            BOOK_COLUMNS
        ))
        .bind(like_pattern(author))
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn by_genre(&self, genre: &str) -> Result<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {} FROM books WHERE LOWER(genre) = LOWER($1) ORDER BY title ASC",
            BOOK_COLUMNS
        ))
        .bind(genre)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {} FROM books ORDER BY created_at DESC LIMIT $1",
            BOOK_COLUMNS
        ))
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn top_rated(&self, limit: i64) -> Result<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {} FROM books WHERE rating IS NOT NULL ORDER BY rating DESC LIMIT $1",
            BOOK_COLUMNS
        ))
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn search(&self, term: &str) -> Result<Vec<Book>> {
        if term.trim().is_empty() {
            return self.all().await;
        }

        let pattern = like_pattern(term);
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            SELECT {}
            FROM books
            WHERE title ILIKE $1
               OR author ILIKE $1
               OR isbn ILIKE $1
               OR description ILIKE $1
            ORDER BY title ASC
            "#,
            BOOK_COLUMNS
        ))
        .bind(&pattern)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books")
            .fetch_one(self.pool())
            .await
            .map_err(db_err)
    }

    async fn set_cover_image(&self, id: BookId, url: Option<String>) -> Result<()> {
        let result =
            sqlx::query("UPDATE books SET cover_image_url = $1, updated_at = $2 WHERE id = $3")
                .bind(&url)
                .bind(Utc::now())
                .bind(id.as_i64())
                .execute(self.pool())
                .await
                .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("book {} not found", id)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern("dune"), "%dune%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c\\d"), "%c\\\\d%");
    }
}
