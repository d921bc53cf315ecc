/// Authentication module
///
/// Handles JWT token issuance/validation, password hashing, the
/// refresh-token hash store, and the session orchestrator that ties them
/// together for login, logout, and refresh.

mod claims;
mod jwt;
mod password;
mod refresh_store;
mod session;

pub use claims::Claims;
pub use jwt::issue_access_token;
pub use jwt::issue_refresh_token;
pub use jwt::validate_access_token;
pub use jwt::verify_refresh_token;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_store::RefreshTokenStore;
pub use session::LoginOutcome;
pub use session::SessionService;
