//! CIRS server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};
use cirs_api::{middleware::AppState, router as api_router};
use cirs_auth::{RemoteJwks, TokenVerifier};
use cirs_common::Config;
use cirs_core::{IdentityEventService, ReportService, UserService};
use cirs_db::repositories::{ReportRepository, UserRepository};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local development reads .env; ignored when absent
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cirs=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting CIRS server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = cirs_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    cirs_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);

    // Initialize repositories
    let report_repo = ReportRepository::new(Arc::clone(&db));
    let user_repo = UserRepository::new(Arc::clone(&db));

    // Initialize services
    let report_service = ReportService::new(report_repo);
    let user_service = UserService::new(user_repo.clone());
    let identity_event_service = IdentityEventService::new(user_service.clone(), user_repo);

    // Token verification against the identity provider's JWKS
    let jwks = RemoteJwks::new(
        config.auth.jwks_endpoint(),
        Duration::from_secs(config.auth.jwks_ttl_secs),
    )?;
    let verifier = Arc::new(TokenVerifier::new(
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        Arc::new(jwks),
    ));

    if config.auth.webhook_secret.is_none() {
        info!("No webhook secret configured; identity webhooks will be rejected");
    }

    let state = AppState {
        report_service,
        user_service,
        identity_event_service,
        verifier,
        webhook_secret: config.auth.webhook_secret.clone(),
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            cirs_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
