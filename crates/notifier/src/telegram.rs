//! Telegram Bot API client.
//!
//! Only the two methods the worker needs are wrapped: `sendMessage` for
//! delivery and `getMe` for building subscription deep links. Every Bot API
//! reply is a JSON envelope `{ok, result | error_code, description, parameters}`,
//! including on HTTP 4xx, so the envelope is decoded before looking at the status.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tokio::sync::OnceCell;

/// Bot API error code for rate limiting.
const TOO_MANY_REQUESTS: i64 = 429;

/// Request timeout for Bot API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a message was not delivered.
#[derive(Debug, Error)]
pub enum SendError {
    /// The endpoint asked us to back off before trying again.
    #[error("rate limited, retry after {}s", .retry_after.as_secs())]
    Throttled { retry_after: Duration },

    /// The Bot API rejected the request (blocked bot, unknown chat, ...).
    #[error("Bot API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    #[error("invalid Bot API response: {0}")]
    InvalidResponse(String),
}

// reqwest puts the request URL in its error text, and the URL carries the
// bot token. Strip it before the error can reach a log line or a response body.
impl From<reqwest::Error> for SendError {
    fn from(e: reqwest::Error) -> Self {
        SendError::Transport(e.without_url())
    }
}

impl SendError {
    /// Only throttling is worth another attempt; everything else is final
    /// for the notification at hand.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SendError::Throttled { .. })
    }
}

/// Delivers rendered text to a chat on the messaging platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), SendError>;
}

/// Identity of the bot as reported by `getMe`.
#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<i64>,
    description: Option<String>,
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

/// HTTP client for the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    api_url: String,
    token: String,
    me: Arc<OnceCell<BotUser>>,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self, SendError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            me: Arc::new(OnceCell::new()),
        })
    }

    /// Fetch the bot's own user. The result is cached for the client's lifetime.
    pub async fn get_me(&self) -> Result<BotUser, SendError> {
        let me = self
            .me
            .get_or_try_init(|| self.call::<BotUser>("getMe", json!({})))
            .await?;
        Ok(me.clone())
    }

    /// The bot's `@username`, without the `@`.
    pub async fn bot_username(&self) -> Result<String, SendError> {
        self.get_me()
            .await?
            .username
            .ok_or_else(|| SendError::InvalidResponse("bot has no username".to_string()))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, SendError> {
        // The token is part of the path; `From<reqwest::Error>` drops the URL.
        let url = format!("{}/bot{}/{}", self.api_url, self.token, method);

        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let envelope: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
            SendError::InvalidResponse(format!("{method}: HTTP {status}: {e}"))
        })?;

        Self::into_result(method, envelope)
    }

    fn into_result<T>(method: &str, envelope: ApiResponse<T>) -> Result<T, SendError> {
        if envelope.ok {
            return envelope
                .result
                .ok_or_else(|| SendError::InvalidResponse(format!("{method}: missing result")));
        }

        let code = envelope.error_code.unwrap_or_default();
        if code != TOO_MANY_REQUESTS {
            return Err(SendError::Api {
                code,
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        // A 429 without parameters still means "slow down"; wait one second.
        let secs = envelope.parameters.and_then(|p| p.retry_after).unwrap_or(1);
        Err(SendError::Throttled {
            retry_after: Duration::from_secs(secs),
        })
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), SendError> {
        tracing::debug!(chat_id, "Sending Telegram message");

        self.call::<serde_json::Value>(
            "sendMessage",
            json!({
                "chat_id": chat_id,
                "text": text,
            }),
        )
        .await?;

        Ok(())
    }
}
