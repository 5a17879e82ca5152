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

use crate::db::models::{Film, FilmInput};
use crate::web::middleware::auth;
use crate::web::models::AuthenticatedUser;
use crate::web::{AppError, AppState};

pub fn create_films_router(app_state: Arc<AppState>) -> Router<Arc<AppState>> {
    let auth_layer = axum_middleware::from_fn_with_state(app_state, auth::auth);

    Router::new()
        .route(
            "/api/films",
            post(create_film_handler)
                .route_layer(auth_layer.clone())
                .get(list_films_handler),
        )
        .route(
            "/api/films/{id}",
            put(update_film_handler)
                .delete(delete_film_handler)
                .route_layer(auth_layer)
                .get(get_film_handler),
        )
}

async fn list_films_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Film>>, AppError> {
    let films = app_state.store.list_films().await?;
    Ok(Json(films))
}

async fn get_film_handler(
    State(app_state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Film>, AppError> {
    let Path(film_id) = path?;
    app_state
        .store
        .get_film(film_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Film not found".to_string()))
}

async fn create_film_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<FilmInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Film>), AppError> {
    let Json(input) = payload?;
    let film = app_state.store.create_film(&input).await?;

    info!(
        film_id = %film.id,
        user_id = %authenticated_user.id,
        tag_count = film.tags.len(),
        "Film created."
    );
    Ok((StatusCode::CREATED, Json(film)))
}

async fn update_film_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<FilmInput>, JsonRejection>,
) -> Result<Json<Film>, AppError> {
    let Path(film_id) = path?;
    let Json(input) = payload?;

    let film = app_state
        .store
        .update_film(film_id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound("Film not found".to_string()))?;

    info!(%film_id, user_id = %authenticated_user.id, "Film updated.");
    Ok(Json(film))
}

async fn delete_film_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Path(film_id) = path?;

    if !app_state.store.delete_film(film_id).await? {
        return Err(AppError::NotFound("Film not found".to_string()));
    }

    info!(%film_id, user_id = %authenticated_user.id, "Film deleted.");
    Ok(Json(serde_json::json!({ "message": "Film deleted successfully" })))
}
