use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde_json::json;
use tracing::{info, warn};

use shelfmark_core::media::detect_content_type;
use shelfmark_model::BookId;

use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

struct ImageUpload {
    file_name: String,
    data: Bytes,
}

/// Attach a cover image to a book. Replacing an existing cover deletes
/// the old blob first, best-effort: a failed cleanup is logged, never
/// fatal.
pub async fn upload_cover(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Json<serde_json::Value>> {
    let upload = read_image_field(multipart).await?;

    let extension = file_extension(&upload.file_name);
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::bad_request(
            "Invalid file type. Allowed types: jpg, jpeg, png, gif, webp",
        ));
    }

    if upload.data.len() > MAX_IMAGE_BYTES {
        return Err(AppError::bad_request("File size exceeds 10MB limit"));
    }

    let book = state
        .books()
        .find(BookId(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("Book with ID {} not found", id)))?;

    if let Some(old_url) = book.cover_image_url.as_deref()
        && !old_url.is_empty()
        && !state.covers().delete(old_url).await
    {
        warn!(id, url = old_url, "previous cover not removed before replace");
    }

    let image_url = state
        .covers()
        .upload(upload.data, &format!("book-{}-{}", id, upload.file_name))
        .await?;

    state
        .books()
        .set_cover_image(BookId(id), Some(image_url.clone()))
        .await?;

    info!(id, url = %image_url, "cover uploaded");
    Ok(Json(json!({ "imageUrl": image_url })))
}

/// Detach and remove a book's cover image. The record is cleared even
/// when the blob removal fails; the database stays authoritative.
pub async fn delete_cover(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let book = state
        .books()
        .find(BookId(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("Book with ID {} not found", id)))?;

    let Some(url) = book.cover_image_url.filter(|u| !u.is_empty()) else {
        return Err(AppError::bad_request("Book has no image to delete"));
    };

    if !state.covers().delete(&url).await {
        warn!(id, url = %url, "cover blob removal failed, clearing record anyway");
    }

    state.books().set_cover_image(BookId(id), None).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Serve a stored cover by object name. Covers are immutable once
/// written (uploads always mint a new name), so clients may cache hard.
pub async fn serve_cover(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Response> {
    let bytes = state.covers().get(&name).await?;

    let content_type = detect_content_type(&bytes).unwrap_or("image/jpeg");

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CACHE_CONTROL,
                "public, max-age=31536000".to_string(),
            ),
        ],
        bytes,
    )
        .into_response())
}

async fn read_image_field(mut multipart: Multipart) -> AppResult<ImageUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Malformed multipart request: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("cover").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("Failed to read image field: {}", e)))?;

        if data.is_empty() {
            break;
        }

        return Ok(ImageUpload { file_name, data });
    }

    Err(AppError::bad_request("No image file provided"))
}

fn file_extension(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(file_extension("dune.PNG"), "png");
        assert_eq!(file_extension("cover.JpEg"), "jpeg");
    }

    #[test]
    fn missing_extension_is_empty() {
        assert_eq!(file_extension("cover"), "");
        assert_eq!(file_extension(""), "");
    }

    #[test]
    fn allowed_extension_gate() {
        for ext in ["jpg", "jpeg", "png", "gif", "webp"] {
            assert!(ALLOWED_EXTENSIONS.contains(&ext));
        }
        assert!(!ALLOWED_EXTENSIONS.contains(&"bmp"));
        assert!(!ALLOWED_EXTENSIONS.contains(&"svg"));
    }
}
