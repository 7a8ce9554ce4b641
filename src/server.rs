/// Server setup and initialization
///
/// Wires together all components: database, catalog storage, HTTP routes and
/// the middleware plan. Provides the application factory used by `main` and
/// by the integration tests.

use crate::{
    api::{create_catalog_routes, error::route_not_found, AppState},
    catalog::CatalogStorage,
    config::Config,
    database::Database,
    middleware::MiddlewarePlan,
};
use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Create the main Axum application with all routes and middleware
///
/// Connects to the configured database, creates missing tables, mounts the
/// catalog routes and wraps everything in the middleware plan.
pub async fn create_app(config: &Config) -> Result<Router> {
    let db = Database::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("📋 Initializing catalog storage");
    let storage = CatalogStorage::new(db);
    storage
        .init_schema()
        .await
        .context("Failed to sync catalog schema")?;

    tracing::info!("📡 Creating HTTP router with all endpoints");
    let app = create_catalog_routes()
        .fallback(route_not_found)
        .with_state(AppState::new(storage));

    let app = MiddlewarePlan::from_config(config).apply(app);

    tracing::info!("✅ Application initialized successfully");

    Ok(app)
}

/// Start the HTTP server with the given configuration
///
/// Serves until Ctrl+C; connection info is attached so the rate limiter can
/// key on the peer address.
pub async fn start_server(config: Config) -> Result<()> {
    tracing::info!("🚀 Starting catalog API server...");

    let app = create_app(&config).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    tracing::info!("🌐 Server listening on http://{}", bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 Shutdown signal received");
}
