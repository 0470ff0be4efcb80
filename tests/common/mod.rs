#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use theatre_api::cache::CacheService;
use theatre_api::config::{
    AppConfig, AuthConfig, Config, DatabaseConfig, PaginationConfig, RedisConfig,
};
use theatre_api::database::Database;
use theatre_api::middleware::auth::hash_token;
use theatre_api::{app, AppState};

/// Config with the production defaults and no Redis.
pub fn test_config() -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            rust_log: "theatre_api=debug".to_string(),
        },
        database: DatabaseConfig {
            url: String::new(),
            pool_size: 5,
        },
        redis: RedisConfig { url: None },
        auth: AuthConfig {
            cache_ttl_seconds: 0,
        },
        pagination: PaginationConfig {
            reservation_page_size: 2,
            reservation_max_page_size: 100,
        },
    }
}

/// Full router over the given pool, same as `main` builds it.
pub fn build_test_app(pool: PgPool) -> Router {
    let state = Arc::new(AppState {
        db: Database::from_pool(pool),
        cache: CacheService::disabled(),
        config: test_config(),
    });
    app(state)
}

/// Inserts a user with the given token key. Returns the user id.
pub async fn create_user(pool: &PgPool, email: &str, is_staff: bool, key: &str) -> i64 {
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO users (email, is_staff) VALUES ($1, $2) RETURNING id")
            .bind(email)
            .bind(is_staff)
            .fetch_one(pool)
            .await
            .expect("user insert should succeed");

    sqlx::query("INSERT INTO auth_tokens (key_hash, user_id) VALUES ($1, $2)")
        .bind(hash_token(key))
        .bind(id)
        .execute(pool)
        .await
        .expect("token insert should succeed");

    id
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
