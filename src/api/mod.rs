//! API handlers for Bookshelf REST endpoints

pub mod books;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::StoreMode, error::AppError, models::Book, AppState};

/// Extractor for a book request body
///
/// Strict stores reject bodies that are not a JSON book. Legacy stores never
/// reject and decode with [`Book::decode_lenient`].
pub struct BookPayload(pub Book);

#[async_trait]
impl FromRequest<AppState> for BookPayload {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let mode = state.services.books.mode();

        let bytes = match (Bytes::from_request(req, state).await, mode) {
            (Ok(bytes), _) => bytes,
            (Err(rejection), StoreMode::Legacy) => {
                tracing::debug!("Ignoring unreadable book payload: {}", rejection.body_text());
                return Ok(BookPayload(Book::default()));
            }
            (Err(rejection), StoreMode::Strict) => {
                return Err(AppError::BadRequest(rejection.body_text()));
            }
        };

        match mode {
            StoreMode::Legacy => Ok(BookPayload(Book::decode_lenient(&bytes))),
            StoreMode::Strict => serde_json::from_slice::<Book>(&bytes)
                .map(BookPayload)
                .map_err(|e| AppError::BadRequest(format!("Invalid book payload: {}", e))),
        }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/books", get(books::list_books).post(books::create_book))
        .route(
            "/api/books/:id",
            get(books::get_book)
                .put(books::replace_book)
                .delete(books::delete_book),
        )
        .with_state(state);

    Router::new()
        .merge(api)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
