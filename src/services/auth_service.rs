use tracing::warn;

use crate::db::CatalogStore;
use crate::db::models::User;
use crate::services::token_service::TokenService;
use crate::web::error::AppError;
use crate::web::models::{LoginRequest, LoginResponse};

/// bcrypt work factor used when hashing new passwords.
pub const PASSWORD_HASH_COST: u32 = 10;

pub fn hash_password(plaintext: &str) -> Result<String, AppError> {
    bcrypt::hash(plaintext, PASSWORD_HASH_COST)
        .map_err(|e| AppError::InternalServerError(format!("Password hashing failed: {e}")))
}

/// A stored hash that cannot be parsed counts as a mismatch.
pub fn verify_password(plaintext: &str, password_hash: &str) -> bool {
    match bcrypt::verify(plaintext, password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            warn!(error = %e, "Stored password hash could not be verified.");
            false
        }
    }
}

/// Looks the user up by exact username and checks the password.
/// An unknown username and a wrong password produce the same error.
pub async fn authenticate(
    store: &dyn CatalogStore,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let user = store
        .find_user_by_username(username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    Ok(user)
}

pub async fn login_user(
    store: &dyn CatalogStore,
    token_service: &TokenService,
    req: LoginRequest,
) -> Result<LoginResponse, AppError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Username and password are required".to_string(),
        ));
    }

    let user = authenticate(store, &req.username, &req.password).await?;
    let token = token_service.issue(user.id)?;

    Ok(LoginResponse { token, user })
}
