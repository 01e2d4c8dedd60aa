//! Notification work queue — a Redis list used as a durable FIFO.
//!
//! Producers `LPUSH` identifiers onto the left end; the dispatch loop `RPOP`s
//! from the right end. Both commands are atomic on the Redis side, so any
//! number of producers may run next to the single consumer, and no two pops
//! ever return the same entry.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use uuid::Uuid;

use tg_notify_common::error::AppError;

/// FIFO queue of pending notification identifiers.
///
/// Values are stored as strings so a popped entry can be pushed back
/// verbatim, even when it turns out not to be a valid identifier.
#[async_trait]
pub trait NotificationQueue: Send + Sync {
    /// Append a value to the tail of the queue.
    async fn push(&self, value: &str) -> Result<(), AppError>;

    /// Remove and return the head of the queue, or `None` when it is empty.
    /// Never blocks waiting for new entries.
    async fn pop(&self) -> Result<Option<String>, AppError>;
}

/// Redis-backed notification queue.
#[derive(Clone)]
pub struct RedisQueue {
    redis: ConnectionManager,
    key: String,
}

impl RedisQueue {
    pub fn new(redis: ConnectionManager, key: impl Into<String>) -> Self {
        Self {
            redis,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of identifiers currently waiting.
    pub async fn len(&self) -> Result<usize, AppError> {
        let mut redis = self.redis.clone();
        let len: usize = redis.llen(&self.key).await?;
        Ok(len)
    }
}

#[async_trait]
impl NotificationQueue for RedisQueue {
    async fn push(&self, value: &str) -> Result<(), AppError> {
        let mut redis = self.redis.clone();
        redis.lpush::<_, _, ()>(&self.key, value).await?;
        Ok(())
    }

    async fn pop(&self) -> Result<Option<String>, AppError> {
        let mut redis = self.redis.clone();
        let value: Option<String> = redis.rpop(&self.key, None).await?;
        Ok(value)
    }
}

/// Schedule a notification for delivery.
///
/// The identifier is not checked against the store here; stale identifiers
/// are dropped by the dispatch loop when it fails to resolve them.
pub async fn enqueue<Q>(queue: &Q, notification_id: Uuid) -> Result<(), AppError>
where
    Q: NotificationQueue + ?Sized,
{
    queue.push(&notification_id.to_string()).await?;

    tracing::debug!(notification_id = %notification_id, "Notification enqueued");
    Ok(())
}
