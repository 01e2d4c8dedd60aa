//! Health check endpoint.
//!
//! Reports whether the API can reach the notification store and the queue,
//! along with the current queue depth. Any unreachable dependency turns the
//! response into a 503 so a load balancer stops routing enqueue requests here.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let database = sqlx::query("SELECT 1").execute(&state.pool).await;
    if let Err(e) = &database {
        tracing::warn!(error = %e, "Database health check failed");
    }

    let queue = state.queue();
    let depth = queue.len().await;
    if let Err(e) = &depth {
        tracing::warn!(error = %e, queue = queue.key(), "Queue health check failed");
    }

    let healthy = database.is_ok() && depth.is_ok();
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "unavailable" },
            "service": "tg-notify-api",
            "version": env!("CARGO_PKG_VERSION"),
            "database": database.is_ok(),
            "queue": {
                "name": queue.key(),
                "depth": depth.ok(),
            },
            "telegram": state.telegram.is_some(),
        })),
    )
}
