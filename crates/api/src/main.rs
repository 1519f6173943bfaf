//! Herald API server binary entrypoint.

use std::net::SocketAddr;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use herald_common::config::AppConfig;
use herald_common::redis_pool::create_redis_pool;
use herald_directory::RedisDirectory;
use herald_dispatch::coordinator::BroadcastCoordinator;
use herald_dispatch::provider::ProviderClient;

use herald_api::routes::create_router;
use herald_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("herald_api=debug,herald_dispatch=debug,herald_directory=debug,tower_http=debug")
        }))
        .init();

    tracing::info!("Starting Herald API server...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Create Redis connection
    let redis = create_redis_pool(&config.redis_url).await?;

    // Wire the dispatch core to its collaborators
    let directory = RedisDirectory::new(redis);
    let provider = ProviderClient::new(config.target_url.clone())?;
    let coordinator = BroadcastCoordinator::new(directory.clone(), provider);

    // Build application state
    let state = AppState::new(coordinator, directory, config.clone());

    // Build router
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
