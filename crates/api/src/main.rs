//! TgNotify API server binary entrypoint.

use std::net::SocketAddr;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use tg_notify_common::config::AppConfig;
use tg_notify_common::db::{create_pool, run_migrations};
use tg_notify_common::redis_pool::create_redis_pool;
use tg_notify_notifier::telegram::TelegramClient;

use tg_notify_api::routes::create_router;
use tg_notify_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("tg_notify_api=debug,tg_notify_notifier=debug,tower_http=debug")
        }))
        .init();

    tracing::info!("Starting TgNotify API server...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Create database connection pool
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    run_migrations(&pool).await?;

    // Create Redis connection
    let redis = create_redis_pool(&config.redis_url).await?;

    let telegram = match &config.telegram_bot_token {
        Some(token) => Some(TelegramClient::new(config.telegram_api_url.clone(), token.clone())?),
        None => {
            tracing::warn!("TELEGRAM_BOT_TOKEN not set, subscription links are disabled");
            None
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));

    // Build application state
    let state = AppState::new(pool, redis, config, telegram);

    // Build router
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
