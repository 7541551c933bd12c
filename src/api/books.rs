//! Books API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    config::StoreMode,
    error::AppResult,
    models::Book,
    repository::Replaced,
    AppState,
};

use super::BookPayload;

/// List all books
#[utoipa::path(
    get,
    path = "/api/books",
    tag = "books",
    responses(
        (status = 200, description = "All books in insertion order", body = Vec<Book>)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> Json<Vec<Book>> {
    Json(state.services.books.list().await)
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details (empty book for unknown ids in legacy mode)", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get_by_id(&id).await?;
    Ok(Json(book))
}

/// Create a book
///
/// Any id in the payload is discarded and a new one is assigned.
#[utoipa::path(
    post,
    path = "/api/books",
    tag = "books",
    request_body = Book,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid payload", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    BookPayload(data): BookPayload,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.books.create(data).await?;
    let status = match state.services.books.mode() {
        StoreMode::Strict => StatusCode::CREATED,
        StoreMode::Legacy => StatusCode::OK,
    };
    Ok((status, Json(book)))
}

/// Replace a book
///
/// The stored record takes the path id and moves to the end of the list.
/// In legacy mode an unknown id yields the unchanged book list instead.
#[utoipa::path(
    put,
    path = "/api/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    request_body = Book,
    responses(
        (status = 200, description = "Book replaced", body = Book),
        (status = 400, description = "Invalid payload", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn replace_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    BookPayload(data): BookPayload,
) -> AppResult<Json<Replaced>> {
    let replaced = state.services.books.replace(&id, data).await?;
    Ok(Json(replaced))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Remaining books", body = Vec<Book>),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Book>>> {
    let remaining = state.services.books.delete(&id).await?;
    Ok(Json(remaining))
}
