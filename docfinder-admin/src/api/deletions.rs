//! Delete confirmation endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

/// POST /api/deletions/:token/confirm
pub async fn confirm_delete(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let intent = state.deletions.confirm(state.store.as_ref(), token).await?;
    Ok(Json(json!({
        "deleted": intent.doctor_id,
        "message": format!("{} was deleted", intent.doctor_name),
    })))
}

/// POST /api/deletions/:token/cancel
pub async fn cancel_delete(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if state.deletions.cancel(token) {
        Ok(Json(json!({ "cancelled": true })))
    } else {
        Err(AppError::NotFound("No pending delete for this token".to_string()))
    }
}
