//! # Ganttrack API Server
//!
//! Project/task management backend. Serves a JSON API under `/api`
//! (session-cookie authentication, shared/personal projects,
//! Gantt-style tasks) and the static front-end bundle for every other
//! path.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p ganttrack-api
//! ```

use ganttrack_api::{
    app::{build_router, AppState},
    config::Config,
};
use ganttrack_shared::db::{
    bootstrap::{seed_default_admin, BootstrapAdmin},
    migrations::run_migrations,
    pool::{create_pool, DatabaseConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ganttrack_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Ganttrack API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    // Seed the default admin if the database has none. A failure here
    // is logged and startup continues; the transaction rolls back.
    let admin = BootstrapAdmin {
        email: config.bootstrap.admin_email.clone(),
        password: config.bootstrap.admin_password.clone(),
    };
    if let Err(e) = seed_default_admin(&pool, &admin).await {
        tracing::error!("Admin bootstrap failed: {}", e);
    }

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
