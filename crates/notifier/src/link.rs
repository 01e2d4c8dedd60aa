//! Subscription deep links.
//!
//! A wallet owner opens `https://t.me/<bot>?start=<payload>` to attach their
//! chat to a notification record. The payload is the notification identifier,
//! URL-safe base64 encoded without padding, which keeps it inside the
//! character set and length Telegram accepts for `start` parameters.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use uuid::Uuid;

use tg_notify_common::error::AppError;

use crate::telegram::TelegramClient;

/// Longest payload Telegram accepts in a `start` parameter.
const MAX_START_PAYLOAD_LEN: usize = 64;

/// Encode a deep-link payload.
pub fn encode_payload(payload: &str) -> String {
    URL_SAFE_NO_PAD.encode(payload.as_bytes())
}

/// Build the subscription link for a notification, given the bot username.
pub fn subscription_link(bot_username: &str, notification_id: Uuid) -> Result<String, AppError> {
    let payload = encode_payload(&notification_id.to_string());
    if payload.len() > MAX_START_PAYLOAD_LEN {
        return Err(AppError::Validation(format!(
            "Deep-link payload is {} characters, Telegram allows at most {}",
            payload.len(),
            MAX_START_PAYLOAD_LEN
        )));
    }

    Ok(format!(
        "https://t.me/{}?start={}",
        bot_username.trim_start_matches('@'),
        payload
    ))
}

/// Build the subscription link, asking the Bot API for the bot's username.
pub async fn build_subscription_link(
    telegram: &TelegramClient,
    notification_id: Uuid,
) -> Result<String, AppError> {
    let username = telegram
        .bot_username()
        .await
        .map_err(|e| AppError::Telegram(e.to_string()))?;

    subscription_link(&username, notification_id)
}
