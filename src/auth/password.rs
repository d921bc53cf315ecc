/// Password hashing and verification
///
/// One-way bcrypt hashing with a configurable work factor. The same
/// primitive also hashes refresh-token digests before storage.

use crate::error::AppError;

/// Structural prefix of every bcrypt hash variant ($2a$, $2b$, $2y$).
const BCRYPT_PREFIX: &str = "$2";

/// Hash a value with bcrypt.
///
/// Idempotent on already-hashed input: a value carrying the bcrypt
/// structural prefix is returned unchanged, so a write cycle that passes
/// an existing hash back through this function never double-hashes it.
pub fn hash_password(plain: &str, cost: u32) -> Result<String, AppError> {
    if plain.starts_with(BCRYPT_PREFIX) {
        return Ok(plain.to_string());
    }

    bcrypt::hash(plain, cost)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a candidate value against a stored bcrypt hash.
///
/// The comparison is delegated to bcrypt and never reconstructs the
/// plaintext.
pub fn verify_password(candidate: &str, hash: &str) -> Result<bool, AppError> {
    bcrypt::verify(candidate, hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}
