//! Recipient registration routes (opt-in / opt-out).

use axum::extract::{Path, State};
use axum::routing::{delete, post};
use axum::{Json, Router};
use serde_json::json;

use herald_common::error::AppError;
use herald_common::types::DeliveryRecord;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/recipients/{user_id}", post(register_recipient))
        .route("/api/recipients/{user_id}", delete(unregister_recipient))
}

/// POST /api/recipients/:user_id — store (or replace) delivery details.
async fn register_recipient(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(record): Json<DeliveryRecord>,
) -> Result<Json<serde_json::Value>, AppError> {
    if record.url.is_empty() || record.token.is_empty() {
        return Err(AppError::Validation(
            "url and token must not be empty".to_string(),
        ));
    }

    state
        .directory
        .set_recipient(&user_id, &record)
        .await
        .map_err(|err| AppError::Internal(err.to_string()))?;

    Ok(Json(json!({ "registered": true })))
}

/// DELETE /api/recipients/:user_id — drop the recipient's delivery details.
async fn unregister_recipient(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let removed = state
        .directory
        .remove_recipient(&user_id)
        .await
        .map_err(|err| AppError::Internal(err.to_string()))?;

    if removed {
        Ok(Json(json!({ "deleted": true })))
    } else {
        Err(AppError::NotFound(format!(
            "Recipient {} not found",
            user_id
        )))
    }
}
