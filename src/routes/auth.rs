/// Authentication routes
///
/// Login, logout, and token refresh. The login body carries the user and
/// the access token; the refresh token travels only in an HttpOnly cookie.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{Claims, SessionService};
use crate::error::AppError;
use crate::users::User;

pub const REFRESH_COOKIE: &str = "refresh_token";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub access_token: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /auth/login
///
/// # Errors
/// - 401: Invalid credentials (unknown email or wrong password, never
///   distinguished)
pub async fn login(
    form: web::Json<LoginRequest>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let outcome = sessions.login(form.email.trim(), &form.password).await?;

    let cookie = Cookie::build(REFRESH_COOKIE, outcome.refresh_token)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(
            sessions.jwt_settings().refresh_token_expiry,
        ))
        .path("/")
        .finish();

    Ok(HttpResponse::Created().cookie(cookie).json(LoginResponse {
        user: outcome.user,
        access_token: outcome.access_token,
    }))
}

/// POST /auth/logout
///
/// Requires a valid access token; the subject comes from the injected
/// claims. Idempotent.
pub async fn logout(
    claims: web::ReqData<Claims>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;
    let message = sessions.logout(user_id).await?;

    let mut expired = Cookie::build(REFRESH_COOKIE, "").path("/").finish();
    expired.make_removal();

    Ok(HttpResponse::Created()
        .cookie(expired)
        .json(MessageResponse {
            message: message.to_string(),
        }))
}

/// POST /auth/refresh
///
/// # Errors
/// - 401: malformed, unsigned, or expired refresh token; or deleted subject
/// - 403: no stored refresh session, or stored hash mismatch
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let access_token = sessions.refresh(&form.refresh_token).await?;

    Ok(HttpResponse::Created().json(RefreshResponse { access_token }))
}
