use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use userhub::configuration::{
    ApplicationSettings, CacheSettings, DatabaseSettings, JwtSettings, RedisSettings,
    SecuritySettings, Settings,
};
use userhub::startup::run;
use userhub::users::{CacheError, CacheStore};

/// In-memory stand-in for the redis backend so the server can be exercised
/// without external services.
struct InMemoryCacheStore {
    entries: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set_ex(&self, key: &str, value: &str, _ttl: u64) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

fn test_settings() -> Settings {
    Settings {
        application: ApplicationSettings { port: 0 },
        database: DatabaseSettings {
            username: "postgres".to_string(),
            password: "password".to_string(),
            port: 5432,
            host: "localhost".to_string(),
            database_name: "userhub_test".to_string(),
        },
        redis: RedisSettings {
            url: "redis://localhost:6379".to_string(),
        },
        jwt: JwtSettings {
            access_secret: "access-secret-key-at-least-32-chars-long".to_string(),
            access_token_expiry: 900,
            refresh_secret: "refresh-secret-key-at-least-32-chars-long".to_string(),
            refresh_token_expiry: 604800,
        },
        cache: CacheSettings::default(),
        security: SecuritySettings::default(),
    }
}

fn spawn_app() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let settings = test_settings();
    // Lazy pool: no live database is needed for the routes under test.
    let pool = PgPoolOptions::new()
        .connect_lazy(&settings.database.connection_string())
        .expect("Failed to create lazy pool");
    let cache_store = Arc::new(InMemoryCacheStore {
        entries: Mutex::new(HashMap::new()),
    });

    let server = run(listener, pool, cache_store, settings).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    address
}

#[tokio::test]
async fn health_check_works() {
    let address = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/health_check", &address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}

#[tokio::test]
async fn protected_routes_reject_requests_without_a_token() {
    let address = spawn_app();
    let client = reqwest::Client::new();

    for (method, path) in [
        (reqwest::Method::GET, "/users"),
        (reqwest::Method::POST, "/auth/logout"),
    ] {
        let response = client
            .request(method.clone(), &format!("{}{}", &address, path))
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(
            401,
            response.status().as_u16(),
            "{} {} should require a token",
            method,
            path
        );
        let body: serde_json::Value = response.json().await.expect("body should be JSON");
        assert_eq!(body["code"], "MISSING_TOKEN");
        assert_eq!(body["status"], 401);
    }
}

#[tokio::test]
async fn protected_routes_reject_garbage_tokens() {
    let address = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/users", &address))
        .header("Authorization", "Bearer not.a.token")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let body: serde_json::Value = response.json().await.expect("body should be JSON");
    assert_eq!(body["code"], "TOKEN_INVALID");
}
