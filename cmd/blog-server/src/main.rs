//! # blog-server
//!
//! The entry point that assembles the application based on compile-time features.

mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use api_adapters::AppState;
use auth_adapters::{Argon2Hasher, JwtTokenService};
use configs::Settings;
use domains::{PostRepository, UserRepository};
use services::{AuthService, PaginationPolicy, PostService};
use tokio::net::TcpListener;

#[cfg(not(all(feature = "web-axum", feature = "auth-jwt")))]
compile_error!("blog-server requires the `web-axum` and `auth-jwt` features");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;
    telemetry::init(&settings.log);

    // 1. Initialize Database Implementation
    let (users, posts) = repositories(&settings).await?;

    // 2. Initialize Auth Implementation
    let auth = &settings.auth;
    let hasher = Arc::new(
        Argon2Hasher::new(
            auth.argon2_memory_cost_kib,
            auth.argon2_time_cost,
            auth.argon2_parallelism,
        )
        .context("invalid argon2 settings")?,
    );
    let tokens = Arc::new(JwtTokenService::new(&auth.jwt_secret));

    // 3. Wrap in AppState (dynamic dispatch over the ports)
    let pagination = PaginationPolicy {
        default_limit: settings.pagination.default_limit,
        max_limit: settings.pagination.max_limit,
    };
    let state = AppState {
        auth: Arc::new(AuthService::new(users, hasher, tokens.clone())),
        posts: Arc::new(PostService::new(posts, pagination)),
        tokens,
    };

    let listener = TcpListener::bind(settings.server.addr())
        .await
        .with_context(|| format!("failed to bind {}", settings.server.addr()))?;
    tracing::info!(addr = %listener.local_addr()?, "blog-server listening");

    axum::serve(listener, api_adapters::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("blog-server stopped");
    Ok(())
}

#[cfg(feature = "db-postgres")]
async fn repositories(
    settings: &Settings,
) -> anyhow::Result<(Arc<dyn UserRepository>, Arc<dyn PostRepository>)> {
    use secrecy::ExposeSecret;
    use storage_adapters::postgres;

    let pool = postgres::connect(
        settings.database.url.expose_secret(),
        settings.database.max_connections,
    )
    .await
    .context("failed to connect to database")?;
    postgres::migrate(&pool)
        .await
        .context("failed to run database migrations")?;
    tracing::info!("connected to database");

    let users: Arc<dyn UserRepository> = Arc::new(storage_adapters::PostgresUserRepo::new(pool.clone()));
    let posts: Arc<dyn PostRepository> = Arc::new(storage_adapters::PostgresPostRepo::new(pool));
    Ok((users, posts))
}

#[cfg(not(feature = "db-postgres"))]
async fn repositories(
    _settings: &Settings,
) -> anyhow::Result<(Arc<dyn UserRepository>, Arc<dyn PostRepository>)> {
    tracing::warn!("built without `db-postgres`; data is kept in memory only");
    let users: Arc<dyn UserRepository> = Arc::new(storage_adapters::InMemoryUserRepo::new());
    let posts: Arc<dyn PostRepository> = Arc::new(storage_adapters::InMemoryPostRepo::new());
    Ok((users, posts))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
