/// Refresh-token hash store
///
/// Refresh tokens are never persisted in plaintext: the store keeps a bcrypt
/// hash of the token's SHA-256 digest on the user record, at most one per
/// user. Logging in again overwrites the previous hash, which implicitly
/// invalidates the refresh token held by any earlier session.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AuthError};
use crate::users::{User, UserRepository};

/// bcrypt reads only the first 72 bytes of its input, and signed tokens for
/// one user share a header-and-subject prefix well past that. Digesting
/// first makes every byte of the token significant.
fn digest_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub struct RefreshTokenStore {
    repo: Arc<dyn UserRepository>,
    hash_cost: u32,
}

impl RefreshTokenStore {
    pub fn new(repo: Arc<dyn UserRepository>, hash_cost: u32) -> Self {
        Self { repo, hash_cost }
    }

    /// Hash the refresh token and write it to the user record, overwriting
    /// any prior value. Last write wins under concurrent logins.
    pub async fn record_login(&self, user_id: Uuid, refresh_token: &str) -> Result<(), AppError> {
        let hash = hash_password(&digest_token(refresh_token), self.hash_cost)?;
        self.repo.update_refresh_hash(user_id, Some(&hash)).await
    }

    /// Compare a candidate refresh token against the stored hash and return
    /// the user record on success.
    ///
    /// Fails `InvalidCredentials` when the subject no longer exists,
    /// `NoRefreshSession` when no hash is stored, and `RefreshMismatch` when
    /// the comparison fails. The stored hash is not rotated on success; a
    /// refresh token stays reusable until the next login or logout.
    pub async fn consume_for_refresh(
        &self,
        user_id: Uuid,
        candidate: &str,
    ) -> Result<User, AppError> {
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

        let stored = user
            .refresh_token_hash
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or(AppError::Auth(AuthError::NoRefreshSession))?;

        if !verify_password(&digest_token(candidate.trim()), stored)? {
            return Err(AppError::Auth(AuthError::RefreshMismatch));
        }

        Ok(user)
    }

    /// Clear the stored hash. Idempotent: clearing an absent hash succeeds.
    pub async fn clear_on_logout(&self, user_id: Uuid) -> Result<(), AppError> {
        self.repo.update_refresh_hash(user_id, None).await
    }
}
