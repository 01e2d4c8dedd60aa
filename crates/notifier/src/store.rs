//! Notification store — resolves queued identifiers and records delivery attempts.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use tg_notify_common::error::AppError;
use tg_notify_common::types::{NewTelegramLog, NotificationData, TelegramLog};

/// Read path for notification records and write path for delivery logs.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Look up a notification by identifier. `None` means the identifier is
    /// stale or was never valid.
    async fn get_notification(&self, id: Uuid) -> Result<Option<NotificationData>, AppError>;

    /// Persist the result of a delivery attempt.
    async fn write_log(&self, log: &NewTelegramLog) -> Result<(), AppError>;
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All delivery attempts recorded for a notification, oldest first.
    pub async fn list_logs(&self, notification_id: Uuid) -> Result<Vec<TelegramLog>, AppError> {
        let logs: Vec<TelegramLog> = sqlx::query_as(
            r#"
            SELECT id, notification_data_id, message, is_successfully, sent_at
            FROM telegram_logs
            WHERE notification_data_id = $1
            ORDER BY sent_at, id
            "#,
        )
        .bind(notification_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn get_notification(&self, id: Uuid) -> Result<Option<NotificationData>, AppError> {
        let notification: Option<NotificationData> = sqlx::query_as(
            "SELECT id, wallet_id, telegram_id, created_at FROM notification_data WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    async fn write_log(&self, log: &NewTelegramLog) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO telegram_logs (id, notification_data_id, message, is_successfully, sent_at)
            VALUES ($1, $2, $3, $4, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(log.notification_data_id)
        .bind(&log.message)
        .bind(log.is_successfully)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            notification_id = %log.notification_data_id,
            is_successfully = log.is_successfully,
            "Delivery attempt logged"
        );

        Ok(())
    }
}
