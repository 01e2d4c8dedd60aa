use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A notification that became due for a wallet.
///
/// `telegram_id` is filled in once the wallet owner opens the bot through
/// their subscription link; until then the notification has no destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NotificationData {
    pub id: Uuid,
    pub wallet_id: String,
    pub telegram_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NotificationData {
    /// The chat to deliver to, if the record has a usable one.
    pub fn destination(&self) -> Option<&str> {
        self.telegram_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// A persisted delivery attempt.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TelegramLog {
    pub id: Uuid,
    pub notification_data_id: Uuid,
    pub message: String,
    pub is_successfully: bool,
    pub sent_at: DateTime<Utc>,
}

/// Result of one terminal delivery attempt, ready to be written to the log store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTelegramLog {
    pub notification_data_id: Uuid,
    pub message: String,
    pub is_successfully: bool,
}
