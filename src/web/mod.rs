use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::db::CatalogStore;
use crate::services::TokenService;
use crate::web::routes::*;

pub use crate::web::error::AppError;

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;


#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub token_service: Arc<TokenService>,
}

async fn health_check_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// A `*` entry opens the API to any origin. Browsers refuse credentialed
/// responses to a wildcard, so credentials are only allowed for explicit origins.
pub fn create_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(vec![header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers(vec![header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(12 * 60 * 60));

    if allowed_origins.iter().any(|origin| origin == "*") {
        warn!("CORS is open to any origin; credentials are disabled.");
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring CORS origin that is not a valid header value.");
                None
            }
        })
        .collect();

    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}

pub fn create_axum_router(
    store: Arc<dyn CatalogStore>,
    token_service: Arc<TokenService>,
    allowed_origins: &[String],
) -> Router {
    let app_state = Arc::new(AppState {
        store,
        token_service,
    });

    Router::new()
        .route("/health", get(health_check_handler))
        .merge(auth_routes::create_auth_router())
        .merge(book_routes::create_books_router(app_state.clone()))
        .merge(film_routes::create_films_router(app_state.clone()))
        .with_state(app_state)
        .layer(create_cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
