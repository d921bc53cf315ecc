use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;

use userhub::configuration::get_configuration;
use userhub::startup::run;
use userhub::telemetry::init_telemetry;
use userhub::users::RedisCacheStore;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    // Connections are established on first use; startup does not block on
    // the database being up.
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_lazy(&configuration.database.connection_string())
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Database error")
        })?;

    tracing::info!("Database connection pool created");

    let redis_client = redis::Client::open(configuration.redis.url.as_str()).map_err(|e| {
        tracing::error!("Invalid redis url: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Redis configuration error")
    })?;
    let redis_conn = redis_client.get_connection_manager().await.map_err(|e| {
        tracing::error!("Failed to connect to redis: {}", e);
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Redis connection error")
    })?;
    let cache_store = Arc::new(RedisCacheStore::new(redis_conn));

    tracing::info!("Redis connection established");

    let address = format!("127.0.0.1:{}", configuration.application.port);
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, pool, cache_store, configuration)?;
    server.await
}
