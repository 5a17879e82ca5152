use axum::{
    body::Body as AxumBody,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::services::token_service::bearer_token;
use crate::web::models::AuthenticatedUser;
use crate::web::{AppState, error::AppError};

/// Rejects the request unless the `Authorization` header carries a valid token.
/// The user id from the token is trusted as-is; the user row is not re-read.
pub async fn auth(
    State(state): State<Arc<AppState>>,
    mut req: Request<AxumBody>,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .map(bearer_token)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized)?;

    let claims = state.token_service.verify(token)?;

    req.extensions_mut().insert(AuthenticatedUser { id: claims.user_id });
    Ok(next.run(req).await)
}
