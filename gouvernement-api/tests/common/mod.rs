//! Common test utilities for the API tests
//!
//! Two kinds of context:
//!
//! - [`gated_app`] builds the router over a lazy pool that never connects and
//!   an in-memory access store, for requests that a gate answers before any
//!   handler touches the database;
//! - [`TestContext`] connects to `DATABASE_URL`, runs migrations and
//!   registers users, for the `#[ignore]`d end-to-end tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use gouvernement_api::app::{build_router, AppState};
use gouvernement_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use gouvernement_shared::auth::gate::MemoryAccessStore;
use gouvernement_shared::auth::jwt::{create_token, Claims, TokenType};
use gouvernement_shared::auth::password::hash_password;
use gouvernement_shared::db::migrations::run_migrations;
use gouvernement_shared::models::user::{CreateUser, User};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "router-test-secret-at-least-32-bytes";

pub fn test_config(database_url: &str, secret: &str) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: database_url.to_string(),
            max_connections: 2,
        },
        jwt: JwtConfig {
            secret: secret.to_string(),
        },
    }
}

/// Router whose gates read from `store` and whose pool never connects
pub fn gated_app(store: MemoryAccessStore) -> axum::Router {
    let url = "postgres://gouvernement@localhost:1/unused";
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(url)
        .expect("lazy pool accepts the url");

    let state = AppState::with_access(pool, test_config(url, SECRET), Arc::new(store));
    build_router(state)
}

pub fn bearer(user_id: Uuid, secret: &str) -> String {
    let token = create_token(&Claims::new(user_id, TokenType::Access), secret).expect("token");
    format!("Bearer {token}")
}

pub fn request(method: &str, uri: &str, auth: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

pub async fn send(app: &axum::Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("infallible")
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

/// Database-backed context for end-to-end tests
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let url = std::env::var("DATABASE_URL")?;

        let db = PgPool::connect(&url).await?;
        run_migrations(&db).await?;

        let config = test_config(&url, SECRET);
        let app = build_router(AppState::new(db.clone(), config.clone()));

        Ok(Self { db, app, config })
    }

    /// Registers a user directly and returns it with a bearer header
    pub async fn user(&self, first_name: &str) -> anyhow::Result<(User, String)> {
        let user = User::create(
            &self.db,
            CreateUser {
                email: format!("{}-{}@example.com", first_name.to_lowercase(), Uuid::new_v4()),
                first_name: first_name.to_string(),
                password_hash: hash_password("Test-passw0rd")?,
            },
        )
        .await?;

        let auth = bearer(user.id, &self.config.jwt.secret);
        Ok((user, auth))
    }

    /// Removes users and, through cascades, their projects and tasks
    pub async fn cleanup(&self, users: &[&User]) -> anyhow::Result<()> {
        for user in users {
            User::delete(&self.db, user.id).await?;
        }
        Ok(())
    }
}
