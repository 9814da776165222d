use dotenvy::dotenv;

mod api;
mod config;
mod setup;

use config::{app_config::AppConfig, cache_config, database_config};
use setup::{dependency_injection::DependencyContainer, server::Server};

/// REST API Entry Point
///
/// Initializes the application, wires dependencies, and starts the HTTP server.
/// - config/: Application configuration (server, CORS, database, cache, storage)
/// - setup/: Dependency injection and server setup
/// - api/: Route handlers and DTOs
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing with RUST_LOG env filter
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // 2. Load environment variables
    if let Err(err) = dotenv() {
        tracing::debug!("No .env file loaded: {}", err);
    }

    // 3. Load configuration
    let config = AppConfig::from_env();

    // 4. Connect to the store of record and the cache
    let pool = database_config::init_database().await?;
    let cache_store = cache_config::init_cache().await?;

    // 5. Wire dependencies
    let container = DependencyContainer::new(pool.clone(), cache_store, &config);

    // 6. Run server
    Server::run(config, container).await?;

    pool.close().await;
    Ok(())
}
