//! TgNotify dispatch worker binary entrypoint.

use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use tg_notify_common::config::AppConfig;
use tg_notify_common::db;
use tg_notify_common::redis_pool::create_redis_pool;
use tg_notify_notifier::dispatcher::{Dispatcher, RunMode};
use tg_notify_notifier::queue::RedisQueue;
use tg_notify_notifier::store::PgNotificationStore;
use tg_notify_notifier::telegram::TelegramClient;

/// The dispatcher needs a single connection; one spare covers reconnects.
const WORKER_DB_CONNECTIONS: u32 = 2;

#[derive(Debug, Parser)]
#[command(name = "tg-notify-worker", version, about = "Deliver queued notifications to Telegram")]
struct Cli {
    /// Process at most one queued notification and exit
    #[arg(long)]
    once: bool,

    /// Idle poll interval in milliseconds (overrides DISPATCH_POLL_INTERVAL_MS)
    #[arg(long)]
    poll_interval_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tg_notify_worker=info,tg_notify_notifier=info".into()),
        )
        .json()
        .init();

    tracing::info!("TgNotify worker starting...");

    // Load configuration
    let config = AppConfig::from_env()?;
    let token = config
        .telegram_bot_token
        .clone()
        .ok_or_else(|| anyhow::anyhow!("TELEGRAM_BOT_TOKEN environment variable is required"))?;

    let poll_interval = cli
        .poll_interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.dispatch_poll_interval());
    let mode = if cli.once {
        RunMode::SinglePass
    } else {
        RunMode::Continuous
    };

    // Connect to storage
    let pool = db::create_pool(&config.database_url, WORKER_DB_CONNECTIONS).await?;
    db::run_migrations(&pool).await?;
    let redis = create_redis_pool(&config.redis_url).await?;

    let telegram = TelegramClient::new(config.telegram_api_url.clone(), token)?;
    let shutdown = CancellationToken::new();

    let dispatcher = Dispatcher::new(
        RedisQueue::new(redis, config.notification_queue.clone()),
        PgNotificationStore::new(pool),
        telegram,
        poll_interval,
    )
    .with_shutdown(shutdown.clone());

    // Graceful shutdown on Ctrl+C: finish the notification in flight, then stop
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal, stopping gracefully...");
            shutdown.cancel();
        }
    });

    let stats = dispatcher.run(mode).await?;

    tracing::info!(
        delivered = stats.delivered,
        failed = stats.failed,
        requeued = stats.requeued,
        "TgNotify worker stopped."
    );
    Ok(())
}
