/// User collection module
///
/// Holds the user record model, the repository over the store of record,
/// the Redis-backed collection cache, and the CRUD service that keeps the
/// two consistent.

mod cache;
mod model;
mod repo;
mod service;

pub use cache::CacheError;
pub use cache::CacheStore;
pub use cache::RedisCacheStore;
pub use cache::UserCache;
pub use model::CreateUserRequest;
pub use model::UpdateUserRequest;
pub use model::User;
pub use repo::PgUserRepository;
pub use repo::UserRepository;
pub use service::UsersService;

#[cfg(test)]
pub(crate) use repo::test_support::InMemoryUserRepository;
