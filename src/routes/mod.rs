mod auth;
mod health_check;
mod users;

pub use auth::login;
pub use auth::logout;
pub use auth::refresh;
pub use health_check::health_check;
pub use users::create_user;
pub use users::delete_user;
pub use users::get_user;
pub use users::list_users;
pub use users::update_user;
