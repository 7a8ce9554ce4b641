/// Catalog API server
///
/// Main entry point. Loads configuration, installs logging and starts the
/// HTTP server. The server provides:
/// - Product/category/brand CRUD at /api/v1/*
/// - Health check at /health
/// - OpenAPI document at /swagger/openapi.json

use catalog_api::{config, logging, server::start_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = config::load_dotenv();

    // Invalid configuration is fatal before anything else starts
    let config = config::Config::from_env()?;

    logging::init_logging(&config.logging)?;

    match dotenv {
        Some(path) => tracing::info!("📄 Loaded environment from {}", path.display()),
        None => tracing::info!("📄 No .env file found, using process environment"),
    }
    config.log_summary();

    if let Err(e) = start_server(config).await {
        tracing::error!("❌ Server failed: {:#}", e);
        return Err(e);
    }

    Ok(())
}
