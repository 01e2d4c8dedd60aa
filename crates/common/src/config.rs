use std::time::Duration;

use serde::Deserialize;

/// Default Redis list holding pending notification identifiers.
pub const DEFAULT_NOTIFICATION_QUEUE: &str = "telegram_notification_queue";

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Redis connection string
    pub redis_url: String,

    /// Telegram bot token. The worker refuses to start without it.
    pub telegram_bot_token: Option<String>,

    /// Telegram Bot API base URL (overridable for local bot API servers)
    pub telegram_api_url: String,

    /// Redis list key used as the notification work queue
    pub notification_queue: String,

    /// Idle poll interval of the dispatch loop in milliseconds (default: 50)
    pub dispatch_poll_interval_ms: u64,

    /// Maximum number of PostgreSQL connections in the pool (default: 20)
    pub db_max_connections: u32,

    /// Port the HTTP API listens on (default: 3000)
    pub api_port: u16,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            telegram_api_url: std::env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
            notification_queue: std::env::var("TELEGRAM_NOTIFICATION_QUEUE")
                .unwrap_or_else(|_| DEFAULT_NOTIFICATION_QUEUE.to_string()),
            dispatch_poll_interval_ms: std::env::var("DISPATCH_POLL_INTERVAL_MS")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DISPATCH_POLL_INTERVAL_MS must be a valid u64"))?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("API_PORT must be a valid u16"))?,
        })
    }

    pub fn dispatch_poll_interval(&self) -> Duration {
        Duration::from_millis(self.dispatch_poll_interval_ms)
    }
}
