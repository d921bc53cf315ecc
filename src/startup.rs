use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::SessionService;
use crate::configuration::Settings;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    create_user, delete_user, get_user, health_check, list_users, login, logout, refresh,
    update_user,
};
use crate::users::{CacheStore, PgUserRepository, UserCache, UsersService};

/// Assemble the application: repositories, services, routes, middleware.
///
/// The composition root owns every external handle (pool, cache backend,
/// secrets); components receive them as explicit configuration.
pub fn run(
    listener: TcpListener,
    pool: PgPool,
    cache_store: Arc<dyn CacheStore>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let repo = Arc::new(PgUserRepository::new(pool));

    let sessions = web::Data::new(SessionService::new(
        repo.clone(),
        settings.jwt.clone(),
        settings.security.hash_cost,
    ));
    let users = web::Data::new(UsersService::new(
        repo,
        UserCache::new(cache_store, settings.cache.ttl_seconds),
        settings.security.hash_cost,
    ));
    let jwt_config = settings.jwt;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(sessions.clone())
            .app_data(users.clone())
            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/auth/login", web::post().to(login))
            .route("/auth/refresh", web::post().to(refresh))
            // Logout requires a valid access token
            .service(
                web::resource("/auth/logout")
                    .wrap(JwtMiddleware::new(jwt_config.clone()))
                    .route(web::post().to(logout)),
            )
            // User creation is public, reading the collection is not
            .service(
                web::resource("/users")
                    .route(web::post().to(create_user))
                    .route(
                        web::get()
                            .to(list_users)
                            .wrap(JwtMiddleware::new(jwt_config.clone())),
                    ),
            )
            .service(
                web::resource("/users/{id}")
                    .wrap(JwtMiddleware::new(jwt_config.clone()))
                    .route(web::get().to(get_user))
                    .route(web::put().to(update_user))
                    .route(web::delete().to(delete_user)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
