/// User CRUD service
///
/// Wraps the repository with the collection cache: reads go through the
/// cache, and every mutation commits to the store of record first, then
/// invalidates the cache before reporting success.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::error::AppError;
use crate::telemetry::mask_email;
use crate::users::cache::UserCache;
use crate::users::model::{CreateUserRequest, UpdateUserRequest, User};
use crate::users::repo::UserRepository;
use crate::validators::{
    is_valid_birthdate, is_valid_email, is_valid_name, validate_password_strength,
};

pub struct UsersService {
    repo: Arc<dyn UserRepository>,
    cache: UserCache,
    hash_cost: u32,
}

impl UsersService {
    pub fn new(repo: Arc<dyn UserRepository>, cache: UserCache, hash_cost: u32) -> Self {
        Self {
            repo,
            cache,
            hash_cost,
        }
    }

    /// The whole collection, served from the cache when possible.
    pub async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let repo = self.repo.clone();
        self.cache
            .read_through(move || async move { repo.find_all().await })
            .await
    }

    pub async fn find_one(&self, id: Uuid) -> Result<User, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("user".to_string()))
    }

    pub async fn create(&self, request: CreateUserRequest) -> Result<User, AppError> {
        let name = is_valid_name(&request.name)?;
        let email = is_valid_email(&request.email)?;
        let birthdate = is_valid_birthdate(&request.birthdate)?;
        validate_password_strength(&request.password)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            birthdate,
            password_hash: hash_password(&request.password, self.hash_cost)?,
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        };

        self.repo.insert(&user).await?;
        self.cache.invalidate().await;

        tracing::info!(
            user_id = %user.id,
            email = %mask_email(&user.email),
            "User created"
        );

        Ok(user)
    }

    pub async fn update(&self, id: Uuid, request: UpdateUserRequest) -> Result<User, AppError> {
        let mut user = self.find_one(id).await?;

        if let Some(name) = &request.name {
            user.name = is_valid_name(name)?;
        }
        if let Some(email) = &request.email {
            user.email = is_valid_email(email)?;
        }
        if let Some(birthdate) = &request.birthdate {
            user.birthdate = is_valid_birthdate(birthdate)?;
        }
        if let Some(password) = &request.password {
            // The prefix guard in hash_password keeps an already-hashed
            // value untouched.
            if !password.starts_with("$2") {
                validate_password_strength(password)?;
            }
            user.password_hash = hash_password(password, self.hash_cost)?;
        }
        user.updated_at = Utc::now();

        self.repo.update(&user).await?;
        self.cache.invalidate().await;

        tracing::info!(user_id = %user.id, "User updated");

        Ok(user)
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        // Deleting an absent record is reported, not silently ignored.
        let user = self.find_one(id).await?;

        self.repo.delete(user.id).await?;
        self.cache.invalidate().await;

        tracing::info!(user_id = %user.id, "User removed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::cache::tests::InMemoryCacheStore;
    use crate::users::InMemoryUserRepository;

    const TEST_COST: u32 = 4;

    fn service() -> (UsersService, Arc<InMemoryUserRepository>, Arc<InMemoryCacheStore>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let store = Arc::new(InMemoryCacheStore::new());
        let cache = UserCache::new(store.clone(), 60);
        (
            UsersService::new(repo.clone(), cache, TEST_COST),
            repo,
            store,
        )
    }

    fn create_request(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            birthdate: "1990-05-17".to_string(),
            password: "Secret123".to_string(),
        }
    }

    #[tokio::test]
    async fn create_stores_a_hashed_password() {
        let (service, repo, _store) = service();

        let user = service.create(create_request("ada@x.com")).await.unwrap();
        let stored = repo.password_hash_of(user.id).unwrap();

        assert!(stored.starts_with("$2"));
        assert_ne!(stored, "Secret123");
    }

    #[tokio::test]
    async fn create_rejects_invalid_payloads() {
        let (service, _repo, _store) = service();

        let mut bad_email = create_request("ada@x.com");
        bad_email.email = "not-an-email".to_string();
        assert!(service.create(bad_email).await.is_err());

        let mut bad_birthdate = create_request("ada@x.com");
        bad_birthdate.birthdate = "17/05/1990".to_string();
        assert!(service.create(bad_birthdate).await.is_err());

        let mut weak_password = create_request("ada@x.com");
        weak_password.password = "short".to_string();
        assert!(service.create(weak_password).await.is_err());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (service, _repo, _store) = service();

        service.create(create_request("ada@x.com")).await.unwrap();
        let result = service.create(create_request("ada@x.com")).await;

        assert!(matches!(result, Err(AppError::Duplicate(_))));
    }

    #[tokio::test]
    async fn reads_after_a_mutation_reflect_the_mutation() {
        let (service, _repo, _store) = service();

        service.create(create_request("first@x.com")).await.unwrap();
        // Populate the cache.
        assert_eq!(service.find_all().await.unwrap().len(), 1);

        // Each mutation must invalidate before returning, so the next read
        // repopulates from the store of record.
        let second = service.create(create_request("second@x.com")).await.unwrap();
        assert_eq!(service.find_all().await.unwrap().len(), 2);

        service
            .update(
                second.id,
                UpdateUserRequest {
                    name: Some("Grace Hopper".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let all = service.find_all().await.unwrap();
        assert!(all.iter().any(|u| u.name == "Grace Hopper"));

        service.remove(second.id).await.unwrap();
        assert_eq!(service.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn find_all_hits_the_cache_on_repeat_reads() {
        let (service, _repo, store) = service();

        service.create(create_request("ada@x.com")).await.unwrap();
        service.find_all().await.unwrap();

        assert!(store.entries.lock().unwrap().contains_key("users"));
    }

    #[tokio::test]
    async fn update_rehashes_only_plaintext_passwords() {
        let (service, repo, _store) = service();
        let user = service.create(create_request("ada@x.com")).await.unwrap();
        let original_hash = repo.password_hash_of(user.id).unwrap();

        // Passing the stored hash back through update must not re-hash it.
        service
            .update(
                user.id,
                UpdateUserRequest {
                    password: Some(original_hash.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(repo.password_hash_of(user.id).unwrap(), original_hash);

        // A new plaintext password produces a new hash.
        service
            .update(
                user.id,
                UpdateUserRequest {
                    password: Some("NewSecret456".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_ne!(repo.password_hash_of(user.id).unwrap(), original_hash);
    }

    #[tokio::test]
    async fn update_returns_the_record_as_persisted() {
        let (service, repo, _store) = service();
        let user = service.create(create_request("ada@x.com")).await.unwrap();

        let returned = service
            .update(
                user.id,
                UpdateUserRequest {
                    name: Some("Grace Hopper".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // The timestamp in the response is the one the store holds.
        let stored = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(returned.updated_at, stored.updated_at);
        assert_eq!(returned.name, stored.name);
        assert!(returned.updated_at > returned.created_at);
    }

    #[tokio::test]
    async fn missing_records_are_reported() {
        let (service, _repo, _store) = service();
        let unknown = Uuid::new_v4();

        assert!(matches!(
            service.find_one(unknown).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.remove(unknown).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.update(unknown, UpdateUserRequest::default()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn mutations_succeed_when_the_cache_is_down() {
        let (service, _repo, store) = service();
        store
            .unavailable
            .store(true, std::sync::atomic::Ordering::SeqCst);

        let user = service.create(create_request("ada@x.com")).await.unwrap();
        assert_eq!(service.find_all().await.unwrap().len(), 1);
        service.remove(user.id).await.unwrap();
    }
}
