/// JWT issuance and validation
///
/// Access and refresh tokens carry the same claim shape but are signed with
/// distinct secrets and expiry windows, both taken from configuration.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Generate a short-lived access token for a user.
pub fn issue_access_token(
    user_id: Uuid,
    email: &str,
    config: &JwtSettings,
) -> Result<String, AppError> {
    sign(
        Claims::new(user_id, email.to_string(), config.access_token_expiry),
        &config.access_secret,
    )
}

/// Generate a long-lived refresh token for a user.
pub fn issue_refresh_token(
    user_id: Uuid,
    email: &str,
    config: &JwtSettings,
) -> Result<String, AppError> {
    sign(
        Claims::new(user_id, email.to_string(), config.refresh_token_expiry),
        &config.refresh_secret,
    )
}

fn sign(claims: Claims, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validate an access token and extract its claims.
pub fn validate_access_token(token: &str, config: &JwtSettings) -> Result<Claims, AppError> {
    decode_with(token, &config.access_secret)
}

/// Validate a refresh token's signature and expiry.
///
/// Every failure mode (bad signature, malformed structure, elapsed expiry,
/// wrong secret) collapses into the single `InvalidToken` kind so the
/// response never reveals why a token was rejected.
pub fn verify_refresh_token(token: &str, config: &JwtSettings) -> Result<Claims, AppError> {
    decode_with(token, &config.refresh_secret)
}

fn decode_with(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!(error = %e, "JWT validation failed");
        AppError::Auth(AuthError::InvalidToken)
    })
}
