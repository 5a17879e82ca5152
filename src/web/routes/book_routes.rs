use axum::{
    Json, Router,
    extract::{
        Extension, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    middleware as axum_middleware,
    routing::{post, put},
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::db::models::{Book, BookInput};
use crate::web::middleware::auth;
use crate::web::models::AuthenticatedUser;
use crate::web::{AppError, AppState};

/// Reads are public; create, update and delete need a bearer token.
pub fn create_books_router(app_state: Arc<AppState>) -> Router<Arc<AppState>> {
    let auth_layer = axum_middleware::from_fn_with_state(app_state, auth::auth);

    Router::new()
        .route(
            "/api/books",
            post(create_book_handler)
                .route_layer(auth_layer.clone())
                .get(list_books_handler),
        )
        .route(
            "/api/books/{id}",
            put(update_book_handler)
                .delete(delete_book_handler)
                .route_layer(auth_layer)
                .get(get_book_handler),
        )
}

async fn list_books_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Book>>, AppError> {
    let books = app_state.store.list_books().await?;
    Ok(Json(books))
}

async fn get_book_handler(
    State(app_state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(book_id) = path?;
    app_state
        .store
        .get_book(book_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
}

async fn create_book_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Json(input) = payload?;
    let book = app_state.store.create_book(&input).await?;

    info!(
        book_id = %book.id,
        user_id = %authenticated_user.id,
        tag_count = book.tags.len(),
        "Book created."
    );
    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(book_id) = path?;
    let Json(input) = payload?;

    let book = app_state
        .store
        .update_book(book_id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

    info!(%book_id, user_id = %authenticated_user.id, "Book updated.");
    Ok(Json(book))
}

async fn delete_book_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Path(book_id) = path?;

    if !app_state.store.delete_book(book_id).await? {
        return Err(AppError::NotFound("Book not found".to_string()));
    }

    info!(%book_id, user_id = %authenticated_user.id, "Book deleted.");
    Ok(Json(serde_json::json!({ "message": "Book deleted successfully" })))
}
