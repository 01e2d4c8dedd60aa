//! Shared application state for the Axum API server.

use redis::aio::ConnectionManager;
use sqlx::PgPool;

use tg_notify_common::config::AppConfig;
use tg_notify_notifier::queue::RedisQueue;
use tg_notify_notifier::store::PgNotificationStore;
use tg_notify_notifier::telegram::TelegramClient;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub redis: ConnectionManager,
    pub config: AppConfig,
    /// `None` when no bot token is configured; link generation is then unavailable.
    pub telegram: Option<TelegramClient>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        redis: ConnectionManager,
        config: AppConfig,
        telegram: Option<TelegramClient>,
    ) -> Self {
        Self {
            pool,
            redis,
            config,
            telegram,
        }
    }

    pub fn queue(&self) -> RedisQueue {
        RedisQueue::new(self.redis.clone(), self.config.notification_queue.clone())
    }

    pub fn store(&self) -> PgNotificationStore {
        PgNotificationStore::new(self.pool.clone())
    }
}
