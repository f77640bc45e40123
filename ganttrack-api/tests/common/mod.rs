/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup (migrations run on first use)
/// - Seeded admin and regular test users
/// - Session cookie generation
/// - Request/response helpers
///
/// Tests require `DATABASE_URL` and `SESSION_SECRET` in the environment
/// (a `.env` file works).

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use ganttrack_api::app::{build_router, AppState};
use ganttrack_api::config::Config;
use ganttrack_shared::auth::password::hash_password;
use ganttrack_shared::auth::session::{create_token, SessionClaims, SESSION_COOKIE};
use ganttrack_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use uuid::Uuid;

/// Password every seeded test user gets
pub const TEST_PASSWORD: &str = "Sup3r-Secret!";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub admin: User,
    pub user: User,
}

impl TestContext {
    /// Creates a new test context with seeded admin and regular users
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations").run(&db).await?;

        let password_hash = hash_password(TEST_PASSWORD)?;

        let admin = User::create(
            &db,
            CreateUser {
                last_name: "Test".to_string(),
                first_name: "Admin".to_string(),
                email: format!("admin-{}@example.com", Uuid::new_v4()),
                password_hash: password_hash.clone(),
                is_admin: true,
            },
        )
        .await?;

        let user = User::create(
            &db,
            CreateUser {
                last_name: "Test".to_string(),
                first_name: "Member".to_string(),
                email: format!("member-{}@example.com", Uuid::new_v4()),
                password_hash,
                is_admin: false,
            },
        )
        .await?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            admin,
            user,
        })
    }

    /// Returns a Cookie header value carrying a session for the user
    pub fn session_cookie_for(&self, user: &User) -> String {
        let claims = SessionClaims::new(user.id, user.is_admin);
        let token =
            create_token(&claims, &self.config.session.secret).expect("Should create token");
        format!("{}={}", SESSION_COOKIE, token)
    }

    /// Cleans up the seeded test users
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        User::delete(&self.db, self.admin.id).await?;
        User::delete(&self.db, self.user.id).await?;
        Ok(())
    }
}

/// Builds a request with an optional session cookie and JSON body
pub fn request(
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Reads a response body as JSON
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Extracts the session cookie pair ("name=value") from a response
pub fn session_cookie_from(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .next()
        .map(str::to_string)
}
