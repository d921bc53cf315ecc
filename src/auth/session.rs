/// Session orchestrator
///
/// Composes the token codec and the refresh-token store into the three
/// session operations: login, logout, and refresh. Holds no mutable state
/// of its own; everything lives on the user record.

use std::sync::Arc;
use uuid::Uuid;

use crate::auth::jwt::{issue_access_token, issue_refresh_token, verify_refresh_token};
use crate::auth::password::verify_password;
use crate::auth::refresh_store::RefreshTokenStore;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::telemetry::mask_email;
use crate::users::{User, UserRepository};

pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct SessionService {
    repo: Arc<dyn UserRepository>,
    store: RefreshTokenStore,
    jwt: JwtSettings,
}

impl SessionService {
    pub fn new(repo: Arc<dyn UserRepository>, jwt: JwtSettings, hash_cost: u32) -> Self {
        let store = RefreshTokenStore::new(repo.clone(), hash_cost);
        Self { repo, store, jwt }
    }

    pub fn jwt_settings(&self) -> &JwtSettings {
        &self.jwt
    }

    /// Authenticate with email and password, mint a token pair, and persist
    /// the refresh-token hash.
    ///
    /// Unknown email and wrong password both fail `InvalidCredentials`;
    /// responses never reveal whether the account exists.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let user = match self.repo.find_by_email(email).await? {
            Some(user) => user,
            None => {
                tracing::warn!(email = %mask_email(email), "Login failed: unknown email");
                return Err(AppError::Auth(AuthError::InvalidCredentials));
            }
        };

        if !verify_password(password, &user.password_hash)? {
            tracing::warn!(email = %mask_email(email), "Login failed: wrong password");
            return Err(AppError::Auth(AuthError::InvalidCredentials));
        }

        let access_token = issue_access_token(user.id, &user.email, &self.jwt)?;
        let refresh_token = issue_refresh_token(user.id, &user.email, &self.jwt)?;
        self.store.record_login(user.id, &refresh_token).await?;

        tracing::info!(
            user_id = %user.id,
            email = %mask_email(&user.email),
            "Login successful"
        );

        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Clear the stored refresh-token hash. Idempotent.
    pub async fn logout(&self, user_id: Uuid) -> Result<&'static str, AppError> {
        self.store.clear_on_logout(user_id).await?;

        tracing::info!(user_id = %user_id, "Logout successful");

        Ok("Logout successful")
    }

    /// Exchange a valid refresh token for a new access token.
    ///
    /// The refresh token is not rotated: the stored hash survives a
    /// successful refresh and stays valid until the next login or logout.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let claims = verify_refresh_token(refresh_token, &self.jwt)?;
        let user_id = claims.user_id()?;

        let user = self.store.consume_for_refresh(user_id, refresh_token).await?;
        let access_token = issue_access_token(user.id, &user.email, &self.jwt)?;

        tracing::info!(user_id = %user.id, "Access token renewed via refresh token");

        Ok(access_token)
    }
}
