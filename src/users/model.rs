use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user record as held by the store of record.
///
/// The password hash and refresh-token hash never leave the server: both are
/// skipped on serialization, so the struct can be returned from handlers and
/// written to the cache directly. Cache hits deserialize with the secret
/// fields defaulted; authentication paths always read the store of record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub birthdate: NaiveDate,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(skip_serializing, default)]
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for POST /users
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    /// `YYYY-MM-DD`
    pub birthdate: String,
    pub password: String,
}

/// Payload for PUT /users/{id}; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub birthdate: Option<String>,
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            birthdate: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
            password_hash: "$2b$12$secret".to_string(),
            refresh_token_hash: Some("$2b$12$refresh".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("refresh_token_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }
}
