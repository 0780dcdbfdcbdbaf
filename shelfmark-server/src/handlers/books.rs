use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use shelfmark_model::{Book, BookId, BookPayload};

use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

/// Full-replace update body: the record id travels in the body as well as
/// the path, and the two must agree.
#[derive(Debug, Deserialize)]
pub struct UpdateBookRequest {
    pub id: i64,
    #[serde(flatten)]
    pub payload: BookPayload,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(rename = "searchTerm", default)]
    pub search_term: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CountQuery {
    pub count: Option<i64>,
}

const DEFAULT_LIST_COUNT: i64 = 10;
const MAX_LIST_COUNT: i64 = 100;

pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.books().all().await?;
    Ok(Json(books))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Book>> {
    let book = state
        .books()
        .find(BookId(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("Book with ID {} not found", id)))?;

    Ok(Json(book))
}

pub async fn create_book(
    State(state): State<AppState>,
    Json(payload): Json<BookPayload>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    // Pre-check for a clean conflict message; the unique index still
    // backstops concurrent creates.
    if let Some(isbn) = payload.isbn_trimmed()
        && state.books().find_by_isbn(isbn).await?.is_some()
    {
        return Err(AppError::conflict(format!(
            "A book with ISBN {} already exists",
            isbn
        )));
    }

    let book = state.books().add(payload).await?;
    info!(id = %book.id, title = %book.title, "book created");

    let location = format!("/api/v1/books/{}", book.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(book),
    ))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateBookRequest>,
) -> AppResult<StatusCode> {
    request.payload.validate()?;

    if id != request.id {
        return Err(AppError::bad_request("ID mismatch"));
    }

    let existing = state
        .books()
        .find(BookId(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("Book with ID {} not found", id)))?;

    // Reusing the record's own ISBN never conflicts; taking another
    // record's does.
    if let Some(isbn) = request.payload.isbn_trimmed()
        && existing.isbn.as_deref() != Some(isbn)
        && let Some(other) = state.books().find_by_isbn(isbn).await?
        && other.id != existing.id
    {
        return Err(AppError::conflict(format!(
            "Another book with ISBN {} already exists",
            isbn
        )));
    }

    state.books().update(BookId(id), request.payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let book = state
        .books()
        .find(BookId(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("Book with ID {} not found", id)))?;

    // Cascade to the cover blob, best-effort: an orphaned object must
    // never block the delete.
    if let Some(url) = book.cover_image_url.as_deref()
        && !url.is_empty()
        && !state.covers().delete(url).await
    {
        tracing::warn!(id, url, "cover blob not removed during book delete");
    }

    state.books().delete(BookId(id)).await?;
    info!(id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn search_books(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let term = query.search_term.unwrap_or_default();
    let books = state.books().search(&term).await?;
    Ok(Json(books))
}

pub async fn books_by_author(
    State(state): State<AppState>,
    Path(author): Path<String>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.books().by_author(&author).await?;
    Ok(Json(books))
}

pub async fn books_by_genre(
    State(state): State<AppState>,
    Path(genre): Path<String>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.books().by_genre(&genre).await?;
    Ok(Json(books))
}

pub async fn book_by_isbn(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state
        .books()
        .find_by_isbn(&isbn)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Book with ISBN {} not found", isbn)))?;

    Ok(Json(book))
}

pub async fn recent_books(
    State(state): State<AppState>,
    Query(query): Query<CountQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let count = checked_count(query.count)?;
    let books = state.books().recent(count).await?;
    Ok(Json(books))
}

pub async fn top_rated_books(
    State(state): State<AppState>,
    Query(query): Query<CountQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let count = checked_count(query.count)?;
    let books = state.books().top_rated(count).await?;
    Ok(Json(books))
}

pub async fn count_books(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let count = state.books().count().await?;
    Ok(Json(json!({ "count": count })))
}

/// Clamp list sizes before they reach the repository.
fn checked_count(count: Option<i64>) -> AppResult<i64> {
    let count = count.unwrap_or(DEFAULT_LIST_COUNT);
    if !(1..=MAX_LIST_COUNT).contains(&count) {
        return Err(AppError::bad_request("Count must be between 1 and 100"));
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_defaults_to_ten() {
        assert_eq!(checked_count(None).unwrap(), 10);
    }

    #[test]
    fn count_bounds_are_enforced() {
        assert!(checked_count(Some(1)).is_ok());
        assert!(checked_count(Some(100)).is_ok());
        assert_eq!(
            checked_count(Some(0)).unwrap_err().status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            checked_count(Some(101)).unwrap_err().status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            checked_count(Some(-5)).unwrap_err().status,
            StatusCode::BAD_REQUEST
        );
    }
}
