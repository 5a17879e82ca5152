use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;
use uuid::Uuid;

use crate::web::error::AppError;
use crate::web::models::Claims;

/// Tokens expire this long after they are issued. There is no revocation.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Signs and verifies bearer tokens with one symmetric key fixed at startup.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(jwt_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Only the HMAC family is accepted; any other `alg` header is rejected.
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: Uuid, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let expiration = issued_at + Duration::hours(TOKEN_LIFETIME_HOURS);

        let claims = Claims {
            user_id,
            iat: issued_at.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::TokenCreationError(e.to_string()))
    }

    /// Checks signature, algorithm and expiry. Every failure is the same `Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| {
                debug!(error = ?e, "Rejected bearer token.");
                AppError::Unauthorized
            })
    }
}

/// Extracts the token from an `Authorization` header value. A leading
/// `"Bearer "` is stripped; anything else is taken as the raw token.
pub fn bearer_token(header_value: &str) -> &str {
    header_value.strip_prefix("Bearer ").unwrap_or(header_value)
}
