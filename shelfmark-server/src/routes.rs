use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::get,
};
use serde_json::{Value, json};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::auth_middleware;
use crate::handlers::{books, covers};
use crate::infra::app_state::AppState;

/// Accept request bodies comfortably above the 10 MiB image limit so the
/// handler can reject oversized uploads with a 400 instead of the
/// transport cutting them off with a 413.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// The versioned book-catalog resource.
fn create_api_router(state: &AppState) -> Router<AppState> {
    let mut books_router = Router::new()
        .route(
            "/books",
            get(books::list_books).post(books::create_book),
        )
        .route("/books/search", get(books::search_books))
        .route("/books/count", get(books::count_books))
        .route("/books/recent", get(books::recent_books))
        .route("/books/top-rated", get(books::top_rated_books))
        .route("/books/author/{author}", get(books::books_by_author))
        .route("/books/genre/{genre}", get(books::books_by_genre))
        .route("/books/isbn/{isbn}", get(books::book_by_isbn))
        .route(
            "/books/{id}",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route(
            "/books/{id}/image",
            axum::routing::post(covers::upload_cover).delete(covers::delete_cover),
        );

    if state.config().auth_enabled {
        books_router = books_router.route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));
    }

    // Cover serving stays public: clients load these URLs from plain
    // <img> tags with no Authorization header.
    books_router.route("/covers/{name}", get(covers::serve_cover))
}

pub fn create_app(state: AppState) -> Router {
    // Build CORS layer (permissive in dev, allow-list in prod)
    let cors_layer = if state.config().dev_mode {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config()
            .cors_allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();
        let allow_origin = if origins.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(origins)
        };

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/ping", get(ping_handler))
        .route("/health", get(health_handler))
        .nest("/api/v1", create_api_router(&state))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

async fn ping_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Shelfmark server is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
