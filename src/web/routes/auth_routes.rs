use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::services::auth_service;
use crate::web::models::{LoginRequest, LoginResponse};
use crate::web::{AppError, AppState};

pub fn create_auth_router() -> Router<Arc<AppState>> {
    Router::new().route("/api/auth/login", post(login_handler))
}

async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload?;

    match auth_service::login_user(app_state.store.as_ref(), &app_state.token_service, req).await {
        Ok(login_response) => {
            info!(user_id = %login_response.user.id, "User logged in.");
            Ok(Json(login_response))
        }
        Err(e) => {
            debug!(error = %e, "Login rejected.");
            Err(e)
        }
    }
}
