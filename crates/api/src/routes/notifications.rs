//! Notification routes: scheduling deliveries and onboarding links.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use uuid::Uuid;

use tg_notify_common::error::AppError;
use tg_notify_notifier::link::build_subscription_link;
use tg_notify_notifier::queue::enqueue;
use tg_notify_notifier::store::NotificationStore;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications/{id}/enqueue", post(enqueue_notification))
        .route(
            "/api/notifications/{id}/subscription-link",
            get(subscription_link),
        )
}

/// POST /api/notifications/:id/enqueue — Schedule a notification for delivery.
///
/// The identifier is queued as-is; the worker drops it later if it does not resolve.
async fn enqueue_notification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    enqueue(&state.queue(), id).await?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "queued": id }))))
}

/// GET /api/notifications/:id/subscription-link — Deep link that attaches a chat.
async fn subscription_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let telegram = state
        .telegram
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("Telegram bot is not configured".to_string()))?;

    if state.store().get_notification(id).await?.is_none() {
        return Err(AppError::NotFound(format!("Notification {} not found", id)));
    }

    let link = build_subscription_link(telegram, id).await?;
    Ok(Json(json!({ "link": link })))
}
