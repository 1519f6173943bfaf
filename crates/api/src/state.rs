//! Shared application state for the Axum API server.

use herald_common::config::AppConfig;
use herald_directory::RedisDirectory;
use herald_dispatch::coordinator::BroadcastCoordinator;
use herald_dispatch::provider::ProviderClient;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: BroadcastCoordinator<RedisDirectory, ProviderClient>,
    pub directory: RedisDirectory,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(
        coordinator: BroadcastCoordinator<RedisDirectory, ProviderClient>,
        directory: RedisDirectory,
        config: AppConfig,
    ) -> Self {
        Self {
            coordinator,
            directory,
            config,
        }
    }
}
