//! Broadcast route — fan one message out to every registered recipient.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use herald_common::error::AppError;
use herald_common::types::BroadcastMessage;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/notifications/broadcast", post(send_broadcast))
}

/// Reject messages the providers would render blank. Everything past this
/// point is the dispatch core's concern.
fn validate(message: &BroadcastMessage) -> Result<(), AppError> {
    if message.title.is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }
    if message.body.is_empty() {
        return Err(AppError::Validation("body must not be empty".to_string()));
    }
    Ok(())
}

/// POST /api/notifications/broadcast — deliver `{title, body}` to every
/// registered recipient and report the aggregate result.
///
/// Always answers success once the run completes, even when zero
/// notifications landed; only losing the recipient directory is an error.
async fn send_broadcast(
    State(state): State<AppState>,
    Json(message): Json<BroadcastMessage>,
) -> Result<Json<serde_json::Value>, AppError> {
    validate(&message)?;

    let summary = state
        .coordinator
        .broadcast(&message)
        .await
        .map_err(|err| AppError::Internal(err.to_string()))?;

    Ok(Json(json!({ "success": true, "results": summary })))
}
