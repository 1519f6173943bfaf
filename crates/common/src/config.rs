use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Redis connection string (recipient directory)
    pub redis_url: String,

    /// Deployment URL included in every provider payload as `targetUrl`.
    /// Providers open this URL when the user taps the notification.
    pub target_url: String,

    /// Port the API server binds to (default: 3000)
    pub api_port: u16,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            target_url: std::env::var("TARGET_URL")
                .map_err(|_| anyhow::anyhow!("TARGET_URL environment variable is required"))?,
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("API_PORT must be a valid u16"))?,
        })
    }
}
